pub mod lava_server_store;
