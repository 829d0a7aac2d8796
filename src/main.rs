use chrono::Utc;
use dotenv::dotenv;
use log::info;

mod aggregator;
mod config;
mod error;
mod models;
mod ranking;
mod rewards;
mod services;
mod units;

use crate::aggregator::aggregate;
use crate::config::Config;
use crate::models::{AggregateStats, PeriodSelector};
use crate::services::graph_client::GraphClient;
use crate::services::{
    delegation_fetcher, network_fetcher, renderer, rewards_fetcher, snapshot_writer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    info!(
        "Starting The Graph protocol metrics generator v{}",
        env!("CARGO_PKG_VERSION")
    );
    let config = Config::from_env()?;
    let client = GraphClient::new(&config.api_key);

    // "now" is captured once and threaded through aggregation and into the
    // embedded dataset, so client-side recomputation matches this run
    let now = Utc::now();
    let now_ts = now.timestamp();

    info!("Fetching data sections...");
    let (networks, events, network_rewards, daily_series) = tokio::try_join!(
        network_fetcher::fetch_network_stats(&client, config.page_size, config.max_pages),
        delegation_fetcher::fetch_delegation_events(&client, config.page_size, config.max_pages),
        rewards_fetcher::fetch_network_rewards(&client),
        rewards_fetcher::fetch_daily_rewards(&client, config.page_size, config.max_pages),
    )?;

    let top = ranking::top_networks(&networks, config.top_n);
    let percentage = ranking::percentage_of_total(&top, &networks);
    info!(
        "Top {} networks cover {:.1}% of {} subgraphs",
        top.len(),
        percentage,
        networks.iter().map(|s| s.subgraph_count).sum::<u64>()
    );

    let aggregates: Vec<(PeriodSelector, AggregateStats)> = [
        PeriodSelector::All,
        PeriodSelector::Last90Days,
        PeriodSelector::Last30Days,
    ]
    .into_iter()
    .map(|period| {
        (
            period,
            aggregate(&events, period, config.min_event_amount, now_ts),
        )
    })
    .collect();

    let quarterly = rewards::quarterly_breakdown(&daily_series, now, config.quarters);

    let snapshot = snapshot_writer::build_snapshot(
        now,
        &networks,
        &top,
        percentage,
        events.len(),
        &aggregates,
        &network_rewards,
        &quarterly,
    );
    snapshot_writer::write_snapshot(&snapshot, &config.output_snapshot)?;

    let html = renderer::render_dashboard(
        now,
        now_ts,
        config.min_event_amount,
        &networks,
        &top,
        percentage,
        &events,
        &aggregates,
        &network_rewards,
        &quarterly,
    )?;
    renderer::write_dashboard(&html, &config.output_html)?;

    info!("Dashboard generation completed successfully");
    Ok(())
}
