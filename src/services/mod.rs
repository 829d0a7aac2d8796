pub mod delegation_fetcher;
pub mod graph_client;
pub mod network_fetcher;
pub mod renderer;
pub mod rewards_fetcher;
pub mod snapshot_writer;
