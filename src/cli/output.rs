//! Output formatting utilities for CLI.

#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;

use serde::Serialize;
use zonectl::game::WorldSnapshot;
use zonectl::skirmish::FactionStats;
use zonectl::SkirmishResult;

/// JSON-serializable single match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult<'a> {
    /// Match summary.
    #[serde(flatten)]
    pub(super) result: &'a SkirmishResult,
    /// World state when the match ended.
    pub(super) snapshot: WorldSnapshot,
}

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &SkirmishResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Skirmish Result (seed: {})", result.seed);
    match result.winner {
        Some(winner) => {
            let _ = writeln!(output, "  Winner: Faction {winner}");
        }
        None => output.push_str("  Winner: Draw\n"),
    }
    let _ = writeln!(
        output,
        "  Ticks: {} ({:.1}s simulated)\n",
        result.ticks_played, result.sim_time
    );

    for stats in &result.factions {
        let _ = writeln!(
            output,
            "  Faction {}: {} zones, {} alive, {} spawned, {} lost",
            stats.faction, stats.zones_owned, stats.units_alive, stats.units_spawned, stats.units_lost
        );
    }

    output
}

/// Aggregated statistics over many matches.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Win count per faction.
    pub(super) wins: Vec<u64>,
    /// Draw count.
    pub(super) draws: u64,
    /// Units spawned per faction across all games.
    spawned: Vec<u64>,
    /// Units lost per faction across all games.
    lost: Vec<u64>,
    /// Total ticks across all games.
    total_ticks: u64,
    /// Total simulated seconds across all games.
    total_sim_time: f64,
}

impl BatchStats {
    /// Create new stats for n factions.
    pub(super) fn new(factions: usize) -> Self {
        Self {
            games_played: 0,
            wins: vec![0; factions],
            draws: 0,
            spawned: vec![0; factions],
            lost: vec![0; factions],
            total_ticks: 0,
            total_sim_time: 0.0,
        }
    }

    /// Add a match result to the stats.
    pub(super) fn add_result(&mut self, result: &SkirmishResult) {
        self.games_played += 1;
        self.total_ticks += u64::from(result.ticks_played);
        self.total_sim_time += result.sim_time;

        match result.winner.map(usize::from) {
            Some(idx) if idx < self.wins.len() => self.wins[idx] += 1,
            Some(_) => {}
            None => self.draws += 1,
        }

        for (i, FactionStats { units_spawned, units_lost, .. }) in result.factions.iter().enumerate() {
            if i < self.spawned.len() {
                self.spawned[i] += u64::from(*units_spawned);
                self.lost[i] += u64::from(*units_lost);
            }
        }
    }

    /// Fold another thread's stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.draws += other.draws;
        self.total_ticks += other.total_ticks;
        self.total_sim_time += other.total_sim_time;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.spawned.iter_mut().zip(&other.spawned) {
            *a += b;
        }
        for (a, b) in self.lost.iter_mut().zip(&other.lost) {
            *a += b;
        }
    }

    fn per_game(&self, total: f64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        total / self.games_played as f64
    }

    /// Win rate for a faction (0.0-1.0).
    pub(super) fn win_rate(&self, faction: usize) -> f64 {
        self.per_game(self.wins.get(faction).copied().unwrap_or(0) as f64)
    }

    /// Draw rate (0.0-1.0).
    pub(super) fn draw_rate(&self) -> f64 {
        self.per_game(self.draws as f64)
    }

    /// Average units spawned per game for a faction.
    pub(super) fn avg_spawned(&self, faction: usize) -> f64 {
        self.per_game(self.spawned.get(faction).copied().unwrap_or(0) as f64)
    }

    /// Average units lost per game for a faction.
    pub(super) fn avg_lost(&self, faction: usize) -> f64 {
        self.per_game(self.lost.get(faction).copied().unwrap_or(0) as f64)
    }

    /// Average game length in ticks.
    pub(super) fn avg_ticks(&self) -> f64 {
        self.per_game(self.total_ticks as f64)
    }

    /// Average game length in simulated seconds.
    pub(super) fn avg_sim_time(&self) -> f64 {
        self.per_game(self.total_sim_time)
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Total games played.
    games_played: u64,
    /// Per-faction statistics.
    factions: Vec<JsonBatchFaction>,
    /// Number of draws.
    draws: u64,
    /// Average game length in ticks.
    avg_ticks: f64,
    /// Average game length in simulated seconds.
    avg_sim_time: f64,
}

/// JSON-serializable per-faction batch stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchFaction {
    /// Faction id.
    faction: usize,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average units spawned per game.
    avg_spawned: f64,
    /// Average units lost per game.
    avg_lost: f64,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        let factions = (0..stats.wins.len())
            .map(|i| JsonBatchFaction {
                faction: i,
                wins: stats.wins[i],
                win_rate: stats.win_rate(i),
                avg_spawned: stats.avg_spawned(i),
                avg_lost: stats.avg_lost(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            factions,
            draws: stats.draws,
            avg_ticks: stats.avg_ticks(),
            avg_sim_time: stats.avg_sim_time(),
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for (i, wins) in stats.wins.iter().enumerate() {
        let _ = writeln!(
            output,
            "  Faction {i}: {:.1}% ({wins} wins)",
            stats.win_rate(i) * 100.0
        );
    }
    let _ = writeln!(
        output,
        "  Draws: {} ({:.1}%)\n",
        stats.draws,
        stats.draw_rate() * 100.0
    );

    output.push_str("Units per Game:\n");
    for i in 0..stats.wins.len() {
        let _ = writeln!(
            output,
            "  Faction {i}: {:.1} spawned, {:.1} lost",
            stats.avg_spawned(i),
            stats.avg_lost(i)
        );
    }

    let _ = writeln!(
        output,
        "\nAverage Game Length: {:.0} ticks ({:.1}s simulated)",
        stats.avg_ticks(),
        stats.avg_sim_time()
    );

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str("faction,wins,win_rate,avg_spawned,avg_lost\n");
    for (i, wins) in stats.wins.iter().enumerate() {
        let _ = writeln!(
            output,
            "{i},{wins},{:.4},{:.2},{:.2}",
            stats.win_rate(i),
            stats.avg_spawned(i),
            stats.avg_lost(i)
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(seed: u64, winner: Option<u8>) -> SkirmishResult {
        SkirmishResult {
            seed,
            winner,
            ticks_played: 100,
            sim_time: 10.0,
            factions: (0..2)
                .map(|faction| FactionStats {
                    faction,
                    zones_owned: 1,
                    units_alive: 2,
                    units_spawned: 4,
                    units_lost: 2,
                })
                .collect(),
        }
    }

    #[test]
    fn test_stats_merge_matches_sequential() {
        let results = [result(0, Some(0)), result(1, None), result(2, Some(1)), result(3, Some(0))];

        let mut sequential = BatchStats::new(2);
        for r in &results {
            sequential.add_result(r);
        }

        let mut left = BatchStats::new(2);
        let mut right = BatchStats::new(2);
        left.add_result(&results[0]);
        left.add_result(&results[1]);
        right.add_result(&results[2]);
        right.add_result(&results[3]);
        left.merge(&right);

        assert_eq!(left.games_played, sequential.games_played);
        assert_eq!(left.wins, vec![2, 1]);
        assert_eq!(left.draws, 1);
        assert!((left.win_rate(0) - 0.5).abs() < 1e-12);
        assert!((left.avg_spawned(1) - 4.0).abs() < 1e-12);
        assert!((left.avg_ticks() - sequential.avg_ticks()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_stats_have_zero_rates() {
        let stats = BatchStats::new(3);
        assert!(stats.win_rate(0).abs() < f64::EPSILON);
        assert!(stats.draw_rate().abs() < f64::EPSILON);
        assert!(stats.avg_sim_time().abs() < f64::EPSILON);
    }

    #[test]
    fn test_csv_has_row_per_faction() {
        let mut stats = BatchStats::new(2);
        stats.add_result(&result(0, Some(1)));
        let csv = format_batch_csv(&stats);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1,1,1.0000,4.00,2.00");
    }

    #[test]
    fn test_text_names_the_winner() {
        let text = format_text(&result(9, Some(1)));
        assert!(text.contains("seed: 9"));
        assert!(text.contains("Winner: Faction 1"));
    }

    #[test]
    fn test_run_json_flattens_result() {
        let world = zonectl::World::new(&zonectl::SimConfig::default(), 0).unwrap();
        let r = result(4, None);
        let json = serde_json::to_string(&JsonRunResult {
            result: &r,
            snapshot: world.snapshot(),
        })
        .unwrap();
        assert!(json.contains("\"seed\":4"));
        assert!(json.contains("\"snapshot\""));
    }
}
