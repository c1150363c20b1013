//! Aggregate statistics over a batch of simulated games.

use crate::runner::GameRecord;
use serde::Serialize;
use std::fmt;

/// Summary of a simulation batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub finished: usize,
    pub wins_by_seat: Vec<u32>,
    pub longest_road_by_seat: Vec<u32>,
    pub average_turns: f64,
    pub average_winning_points: f64,
    pub records: Vec<GameRecord>,
}

impl Summary {
    pub fn from_records(records: Vec<GameRecord>, seats: usize) -> Self {
        let mut wins_by_seat = vec![0; seats];
        let mut longest_road_by_seat = vec![0; seats];
        let mut winning_points = Vec::new();

        for record in &records {
            if let Some(winner) = record.winner {
                if let Some(wins) = wins_by_seat.get_mut(winner as usize) {
                    *wins += 1;
                }
                if let Some(&vp) = record.victory_points.get(winner as usize) {
                    winning_points.push(vp as f64);
                }
            }
            if let Some(holder) = record.longest_road_holder {
                if let Some(count) = longest_road_by_seat.get_mut(holder as usize) {
                    *count += 1;
                }
            }
        }

        let turns: Vec<f64> = records.iter().map(|r| r.turns as f64).collect();
        Self {
            games: records.len(),
            finished: records.iter().filter(|r| r.finished()).count(),
            wins_by_seat,
            longest_road_by_seat,
            average_turns: mean(&turns),
            average_winning_points: mean(&winning_points),
            records,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "games played:     {}", self.games)?;
        writeln!(f, "games finished:   {}", self.finished)?;
        writeln!(f, "average turns:    {:.1}", self.average_turns)?;
        writeln!(f, "average winner VP: {:.1}", self.average_winning_points)?;
        for (seat, wins) in self.wins_by_seat.iter().enumerate() {
            writeln!(
                f,
                "seat {seat}: {wins} wins, held longest road at the end {} times",
                self.longest_road_by_seat[seat]
            )?;
        }
        Ok(())
    }
}
