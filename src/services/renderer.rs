use crate::error::MetricsError;
use crate::models::{
    AggregateStats, DelegationEvent, NetworkStat, PeriodSelector, QuarterlyRewards,
    RewardsSnapshot,
};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fs;

/// The full unfiltered event set embedded in the page, plus the fetch-time
/// "now" and threshold. The inline script recomputes any period from this
/// blob, so toggling never re-fetches and always matches the Rust numbers.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddedDataset<'a> {
    now: i64,
    min_amount: f64,
    events: &'a [DelegationEvent],
}

pub fn write_dashboard(html: &str, path: &str) -> Result<(), MetricsError> {
    fs::write(path, html).map_err(|e| MetricsError::Io {
        path: path.to_string(),
        source: e,
    })?;
    info!("Dashboard saved to {}", path);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn render_dashboard(
    now: DateTime<Utc>,
    now_ts: i64,
    min_amount: f64,
    all_networks: &[NetworkStat],
    top: &[NetworkStat],
    percentage_of_total: f64,
    events: &[DelegationEvent],
    aggregates: &[(PeriodSelector, AggregateStats)],
    network_rewards: &[(String, RewardsSnapshot)],
    quarterly: &[QuarterlyRewards],
) -> Result<String, MetricsError> {
    let dataset = serde_json::to_string(&EmbeddedDataset {
        now: now_ts,
        min_amount,
        events,
    })?;

    let total_all: u64 = all_networks.iter().map(|s| s.subgraph_count).sum();
    let total_top: u64 = top.iter().map(|s| s.subgraph_count).sum();
    let all_period = aggregates
        .iter()
        .find(|(p, _)| *p == PeriodSelector::All)
        .map(|(_, stats)| stats);
    let net = all_period.map(|s| s.net).unwrap_or(0.0);
    let timestamp = now.format("%Y-%m-%d %H:%M UTC");

    let mut html = String::with_capacity(32 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str(concat!(
        "    <meta charset=\"UTF-8\">\n",
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        "    <meta name=\"description\" content=\"The Graph Protocol metrics: subgraph counts, \
         delegation activity and rewards distribution across networks.\">\n",
        "    <title>The Graph Protocol Metrics</title>\n",
    ));
    html.push_str("    <style>\n");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");

    html.push_str("    <div class=\"container\">\n        <div class=\"header\">\n            <h1>The Graph Protocol Metrics</h1>\n        </div>\n        <div class=\"content\">\n");

    // headline cards
    html.push_str("            <div class=\"stats-container\">\n");
    html.push_str(&stats_card(
        &format!("Total Subgraphs<br/>(Top {} Chains)", top.len()),
        &format_count(total_top),
        Some(&format!("{:.1}% of total", percentage_of_total)),
        None,
    ));
    html.push_str(&stats_card(
        "Total Subgraphs<br/>(All Networks)",
        &format_count(total_all),
        None,
        None,
    ));
    html.push_str(&stats_card(
        "Net Delegation<br/>(All Time)",
        &format_tokens(net),
        Some("GRT"),
        Some(if net < 0.0 { "negative" } else { "positive" }),
    ));
    if let Some(quarter) = quarterly.first() {
        let (value, note) = match &quarter.rewards {
            Some(rewards) => (format_tokens(rewards.total_rewards), "GRT distributed"),
            None => ("\u{2014}".to_string(), "unavailable"),
        };
        html.push_str(&stats_card(
            &format!("Rewards<br/>({})", quarter.label),
            &value,
            Some(note),
            None,
        ));
    }
    html.push_str("            </div>\n");

    render_networks_table(&mut html, top);
    render_delegation_section(&mut html, aggregates, min_amount);
    render_rewards_tables(&mut html, network_rewards, quarterly);

    html.push_str(&format!(
        concat!(
            "        </div>\n",
            "        <div class=\"footer\">\n",
            "            <div class=\"footer-top\">\n",
            "                <div class=\"footer-left\">Generated on: {timestamp}</div>\n",
            "                <div class=\"footer-right\"><span class=\"version\">v{version}</span></div>\n",
            "            </div>\n",
            "        </div>\n",
            "    </div>\n"
        ),
        timestamp = timestamp,
        version = env!("CARGO_PKG_VERSION"),
    ));

    html.push_str("    <script>\n    const DATASET = ");
    html.push_str(&dataset);
    html.push_str(";\n");
    html.push_str(SCRIPT);
    html.push_str("    </script>\n</body>\n</html>\n");

    Ok(html)
}

fn stats_card(title: &str, value: &str, note: Option<&str>, value_class: Option<&str>) -> String {
    let class = value_class.map(|c| format!(" {}", c)).unwrap_or_default();
    let note = note
        .map(|n| format!("<div class=\"percentage\">{}</div>", n))
        .unwrap_or_default();
    format!(
        concat!(
            "                <div class=\"stats-card\">\n",
            "                    <h2>{title}</h2>\n",
            "                    <div class=\"total{class}\">{value}</div>\n",
            "                    {note}\n",
            "                </div>\n"
        ),
        title = title,
        class = class,
        value = value,
        note = note,
    )
}

fn render_networks_table(html: &mut String, top: &[NetworkStat]) {
    html.push_str(concat!(
        "            <h2 class=\"section-title\">Top Networks by Subgraph Count</h2>\n",
        "            <table>\n",
        "                <thead>\n",
        "                    <tr>\n",
        "                        <th style=\"width: 10%;\">Rank</th>\n",
        "                        <th style=\"width: 40%;\">Network</th>\n",
        "                        <th style=\"width: 25%;\">Subgraph Count</th>\n",
        "                        <th style=\"width: 25%;\">Unique Indexers</th>\n",
        "                    </tr>\n",
        "                </thead>\n",
        "                <tbody>\n"
    ));
    for (idx, entry) in top.iter().enumerate() {
        html.push_str(&format!(
            concat!(
                "                    <tr>\n",
                "                        <td><span class=\"rank\">#{rank}</span></td>\n",
                "                        <td><a class=\"network-link\" href=\"https://thegraph.com/explorer?indexedNetwork={slug}&orderBy=Query+Count&orderDirection=desc\" target=\"_blank\">{name}</a></td>\n",
                "                        <td>{subgraphs}</td>\n",
                "                        <td>{indexers}</td>\n",
                "                    </tr>\n"
            ),
            rank = idx + 1,
            slug = entry.name,
            name = display_name(&entry.name),
            subgraphs = format_count(entry.subgraph_count),
            indexers = entry.unique_indexer_count,
        ));
    }
    html.push_str("                </tbody>\n            </table>\n");
}

fn render_delegation_section(
    html: &mut String,
    aggregates: &[(PeriodSelector, AggregateStats)],
    min_amount: f64,
) {
    html.push_str(concat!(
        "            <h2 class=\"section-title\">Delegation Activity</h2>\n",
        "            <div class=\"period-toggle\">\n",
        "                <button id=\"period-all\" class=\"period-btn active\" onclick=\"selectPeriod(null, this)\">All</button>\n",
        "                <button id=\"period-90d\" class=\"period-btn\" onclick=\"selectPeriod(90, this)\">Last 90 Days</button>\n",
        "                <button id=\"period-30d\" class=\"period-btn\" onclick=\"selectPeriod(30, this)\">Last 30 Days</button>\n",
        "            </div>\n",
        "            <div class=\"stats-container\">\n"
    ));
    // server-rendered values for the default (All) period; the script
    // overwrites these on toggle
    let all = aggregates
        .iter()
        .find(|(p, _)| *p == PeriodSelector::All)
        .map(|(_, s)| s.clone())
        .unwrap_or(AggregateStats {
            total_delegated: 0.0,
            total_undelegated: 0.0,
            net: 0.0,
            filtered_events: Vec::new(),
        });
    html.push_str(&format!(
        concat!(
            "                <div class=\"stats-card\"><h2>Total Delegated</h2><div class=\"total\" id=\"total-delegated\">{delegated}</div><div class=\"percentage\">GRT</div></div>\n",
            "                <div class=\"stats-card\"><h2>Total Undelegated</h2><div class=\"total\" id=\"total-undelegated\">{undelegated}</div><div class=\"percentage\">GRT</div></div>\n",
            "                <div class=\"stats-card\"><h2>Net</h2><div class=\"total\" id=\"net-delegation\">{net}</div><div class=\"percentage\">GRT</div></div>\n",
            "            </div>\n"
        ),
        delegated = format_tokens(all.total_delegated),
        undelegated = format_tokens(all.total_undelegated),
        net = format_tokens(all.net),
    ));
    html.push_str(&format!(
        concat!(
            "            <button class=\"collapse-toggle\" onclick=\"toggleEvents(this)\">Show events \u{2265} {threshold} GRT</button>\n",
            "            <table id=\"events-table\" class=\"collapsed\">\n",
            "                <thead>\n",
            "                    <tr>\n",
            "                        <th>Date</th>\n",
            "                        <th>Type</th>\n",
            "                        <th>Amount (GRT)</th>\n",
            "                        <th>Delegator</th>\n",
            "                        <th>Indexer</th>\n",
            "                        <th>Tx</th>\n",
            "                    </tr>\n",
            "                </thead>\n",
            "                <tbody id=\"events-body\">\n",
            "                </tbody>\n",
            "            </table>\n"
        ),
        threshold = format_tokens(min_amount),
    ));
}

fn render_rewards_tables(
    html: &mut String,
    network_rewards: &[(String, RewardsSnapshot)],
    quarterly: &[QuarterlyRewards],
) {
    html.push_str(concat!(
        "            <h2 class=\"section-title\">Rewards Distribution</h2>\n",
        "            <table>\n",
        "                <thead>\n",
        "                    <tr>\n",
        "                        <th>Network</th>\n",
        "                        <th>Total Rewards (GRT)</th>\n",
        "                        <th>Indexer Rewards (GRT)</th>\n",
        "                        <th>Delegator Rewards (GRT)</th>\n",
        "                    </tr>\n",
        "                </thead>\n",
        "                <tbody>\n"
    ));
    for (network, rewards) in network_rewards {
        html.push_str(&format!(
            "                    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            display_name(network),
            format_tokens(rewards.total_rewards),
            format_tokens(rewards.indexer_rewards),
            format_tokens(rewards.delegator_rewards),
        ));
    }
    html.push_str(concat!(
        "                </tbody>\n            </table>\n",
        "            <h2 class=\"section-title\">Quarterly Rewards</h2>\n",
        "            <table>\n",
        "                <thead>\n",
        "                    <tr>\n",
        "                        <th>Quarter</th>\n",
        "                        <th>Total (GRT)</th>\n",
        "                        <th>Indexers</th>\n",
        "                        <th>Delegators</th>\n",
        "                    </tr>\n",
        "                </thead>\n",
        "                <tbody>\n"
    ));
    for quarter in quarterly {
        match (&quarter.rewards, quarter.indexer_pct, quarter.delegator_pct) {
            (Some(rewards), Some(indexer_pct), Some(delegator_pct)) => {
                html.push_str(&format!(
                    "                    <tr><td>{}</td><td>{}</td><td>{} ({:.1}%)</td><td>{} ({:.1}%)</td></tr>\n",
                    quarter.label,
                    format_tokens(rewards.total_rewards),
                    format_tokens(rewards.indexer_rewards),
                    indexer_pct,
                    format_tokens(rewards.delegator_rewards),
                    delegator_pct,
                ));
            }
            _ => {
                html.push_str(&format!(
                    "                    <tr><td>{}</td><td colspan=\"3\" class=\"unavailable\">\u{2014} unavailable</td></tr>\n",
                    quarter.label,
                ));
            }
        }
    }
    html.push_str("                </tbody>\n            </table>\n");
}

/// Display-name fixups for network slugs, from the explorer's naming.
pub fn display_name(slug: &str) -> String {
    match slug.to_lowercase().as_str() {
        "mainnet" => "Ethereum (Mainnet)".to_string(),
        "matic" => "Polygon (Matic)".to_string(),
        other => title_case(other),
    }
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Token amounts rendered with thousands separators and no decimals; the
/// dashboard deals in protocol-scale sums where sub-token precision is
/// noise.
fn format_tokens(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);
    let grouped = group_thousands(&digits);
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Poppins', 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #0C0A1D;
            min-height: 100vh;
            padding: 20px;
            color: #F8F6FF;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: #0C0A1D;
            border-radius: 15px;
            border: 1px solid #9CA3AF;
            overflow: hidden;
        }
        .header {
            padding: 30px;
            border-bottom: 1px solid #9CA3AF;
            text-align: center;
        }
        .header h1 { font-size: 2.2em; font-weight: 500; }
        .content { padding: 30px; }
        .section-title { margin: 30px 0 15px 0; font-weight: 500; font-size: 1.3em; }
        .stats-container { display: flex; gap: 15px; margin-bottom: 30px; flex-wrap: wrap; }
        .stats-card {
            background: rgba(12, 10, 29, 0.6);
            border: 1px solid #9CA3AF;
            border-radius: 10px;
            padding: 15px 20px;
            text-align: center;
            flex: 0 0 200px;
        }
        .stats-card h2 { font-size: 0.95em; font-weight: 400; margin-bottom: 15px; }
        .stats-card .total { font-size: 1.6em; color: #4CAF50; font-weight: 600; margin-bottom: 10px; }
        .stats-card .total.negative { color: #E5484D; }
        .stats-card .percentage { font-size: 0.85em; color: #9CA3AF; }
        table {
            width: 100%;
            border-collapse: collapse;
            background: rgba(12, 10, 29, 0.4);
            border: 1px solid #9CA3AF;
            border-radius: 10px;
            overflow: hidden;
            margin-bottom: 20px;
        }
        th {
            background: rgba(12, 10, 29, 0.8);
            padding: 15px;
            text-align: left;
            font-weight: 500;
            border-bottom: 1px solid #9CA3AF;
        }
        td { padding: 12px 15px; border-bottom: 1px solid rgba(156, 163, 175, 0.3); }
        tr:last-child td { border-bottom: none; }
        tr:hover { background: rgba(248, 246, 255, 0.05); }
        .rank {
            background: rgba(156, 163, 175, 0.3);
            padding: 4px 10px;
            border-radius: 20px;
            font-size: 0.85em;
            font-weight: 600;
            display: inline-block;
        }
        .network-link { color: #F8F6FF; text-decoration: none; }
        .period-toggle { display: flex; gap: 10px; margin-bottom: 20px; }
        .period-btn {
            background: rgba(12, 10, 29, 0.6);
            border: 1px solid #9CA3AF;
            border-radius: 8px;
            color: #9CA3AF;
            padding: 8px 16px;
            cursor: pointer;
        }
        .period-btn.active { color: #F8F6FF; border-color: #F8F6FF; }
        .collapse-toggle {
            background: none;
            border: 1px solid #9CA3AF;
            border-radius: 8px;
            color: #9CA3AF;
            padding: 8px 16px;
            cursor: pointer;
            margin-bottom: 10px;
        }
        .collapsed { display: none; }
        .unavailable { color: #9CA3AF; }
        .footer {
            padding: 20px 30px;
            color: #9CA3AF;
            border-top: 1px solid #9CA3AF;
        }
        .footer-top { display: flex; justify-content: space-between; flex-wrap: wrap; gap: 15px; }
        .version { font-size: 0.9em; opacity: 0.8; }
"#;

// Mirror of the server-side aggregation over the embedded dataset. Amounts
// stay BigInt until a single division per sum, matching the Rust numbers.
const SCRIPT: &str = r#"
    function toTokens(wei) {
        return Number(wei / 1000000000000n) / 1e6;
    }

    function aggregate(days) {
        const cutoff = days === null ? null : DATASET.now - days * 86400;
        const retained = DATASET.events.filter(
            e => cutoff === null || e.timestamp >= cutoff
        );
        let delegated = 0n, undelegated = 0n;
        for (const e of retained) {
            const amount = BigInt(e.amount);
            if (e.kind === "delegation") { delegated += amount; } else { undelegated += amount; }
        }
        const rows = retained
            .filter(e => toTokens(BigInt(e.amount)) >= DATASET.minAmount)
            .sort((a, b) => b.timestamp - a.timestamp);
        return {
            totalDelegated: toTokens(delegated),
            totalUndelegated: toTokens(undelegated),
            net: toTokens(delegated) - toTokens(undelegated),
            rows: rows,
        };
    }

    function formatTokens(value) {
        return Math.round(value).toLocaleString("en-US");
    }

    function shorten(id) {
        return id.length > 12 ? id.slice(0, 6) + "…" + id.slice(-4) : id;
    }

    function renderEvents(rows) {
        const body = document.getElementById("events-body");
        body.innerHTML = "";
        for (const e of rows) {
            const tr = document.createElement("tr");
            const date = new Date(e.timestamp * 1000).toISOString().slice(0, 10);
            const cells = [
                date,
                e.kind,
                formatTokens(toTokens(BigInt(e.amount))),
                shorten(e.delegatorAddress),
                shorten(e.indexerAddress),
                shorten(e.transactionHash),
            ];
            for (const text of cells) {
                const td = document.createElement("td");
                td.textContent = text;
                tr.appendChild(td);
            }
            body.appendChild(tr);
        }
    }

    function selectPeriod(days, button) {
        const stats = aggregate(days);
        document.getElementById("total-delegated").textContent = formatTokens(stats.totalDelegated);
        document.getElementById("total-undelegated").textContent = formatTokens(stats.totalUndelegated);
        const net = document.getElementById("net-delegation");
        net.textContent = formatTokens(stats.net);
        net.classList.toggle("negative", stats.net < 0);
        for (const btn of document.querySelectorAll(".period-btn")) {
            btn.classList.remove("active");
        }
        button.classList.add("active");
        renderEvents(stats.rows);
    }

    function toggleEvents(button) {
        const table = document.getElementById("events-table");
        table.classList.toggle("collapsed");
        button.textContent = table.classList.contains("collapsed")
            ? button.textContent.replace("Hide", "Show")
            : button.textContent.replace("Show", "Hide");
    }

    renderEvents(aggregate(null).rows);
"#;
