use crate::models::NetworkStat;

/// Top `n` networks by subgraph count, descending. sort_by is stable, so
/// ties keep their original fetch order.
pub fn top_networks(stats: &[NetworkStat], n: usize) -> Vec<NetworkStat> {
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.subgraph_count.cmp(&a.subgraph_count));
    sorted.truncate(n);
    sorted
}

/// Share of all subgraphs covered by the given top set, rounded to one
/// decimal place. An empty network list yields 0.0 rather than an error.
pub fn percentage_of_total(top: &[NetworkStat], all: &[NetworkStat]) -> f64 {
    let total: u64 = all.iter().map(|s| s.subgraph_count).sum();
    if total == 0 {
        return 0.0;
    }
    let top_total: u64 = top.iter().map(|s| s.subgraph_count).sum();
    (top_total as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(name: &str, subgraphs: u64) -> NetworkStat {
        NetworkStat {
            name: name.to_string(),
            subgraph_count: subgraphs,
            unique_indexer_count: 3,
        }
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let stats = vec![stat("base", 40), stat("mainnet", 90), stat("gnosis", 10)];
        let top = top_networks(&stats, 2);
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["mainnet", "base"]);
    }

    #[test]
    fn ties_keep_fetch_order() {
        let stats = vec![stat("celo", 25), stat("fuse", 25), stat("boba", 25)];
        let top = top_networks(&stats, 3);
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["celo", "fuse", "boba"]);
    }

    #[test]
    fn top_sum_never_exceeds_overall_sum() {
        let stats: Vec<NetworkStat> = (0..30).map(|i| stat(&format!("net{}", i), i)).collect();
        let top = top_networks(&stats, 20);
        let top_sum: u64 = top.iter().map(|s| s.subgraph_count).sum();
        let all_sum: u64 = stats.iter().map(|s| s.subgraph_count).sum();
        assert!(top_sum <= all_sum);
        let pct = percentage_of_total(&top, &stats);
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn percentage_example_eighty_percent() {
        // top-20 covering 1000 of 1250 subgraphs
        let mut stats: Vec<NetworkStat> =
            (0..20).map(|i| stat(&format!("top{}", i), 50)).collect();
        stats.extend((0..10).map(|i| stat(&format!("tail{}", i), 25)));
        let top = top_networks(&stats, 20);
        assert_eq!(percentage_of_total(&top, &stats), 80.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        let stats = vec![stat("a", 1), stat("b", 2)];
        let top = top_networks(&stats, 1);
        // 2/3 = 66.666...%
        assert_eq!(percentage_of_total(&top, &stats), 66.7);
    }

    #[test]
    fn no_networks_yields_zero_percent() {
        assert_eq!(percentage_of_total(&[], &[]), 0.0);
    }
}
