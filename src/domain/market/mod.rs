// Daily price records and their calendar identities
pub mod daily_record;
pub mod raw_table;
pub mod week_id;
