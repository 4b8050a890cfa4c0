mod tracker_entries;
mod users;
