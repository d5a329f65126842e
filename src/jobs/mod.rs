pub mod prices_sync;
