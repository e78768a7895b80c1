use std::fmt;

/// Points awarded per kill.
pub const KILL_POINTS: u32 = 2;

/// Something the kill feed reported this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    Kill { headshot: bool },
    Death,
}

/// Running counters of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchStats {
    pub kills: u32,
    pub deaths: u32,
    pub score: u32,
    pub headshots: u32,
}

impl MatchStats {
    pub fn record(&mut self, event: MatchEvent) {
        match event {
            MatchEvent::Kill { headshot } => {
                self.kills += 1;
                self.score += KILL_POINTS;
                if headshot {
                    self.headshots += 1;
                }
            }
            MatchEvent::Death => self.deaths += 1,
        }
    }

    /// Kills over kills plus deaths, `0.5` when nothing happened yet.
    ///
    /// Counts the whole match, not a sliding window.
    pub fn kill_rate(&self) -> f32 {
        let engagements = self.kills + self.deaths;
        if engagements == 0 {
            0.5
        } else {
            self.kills as f32 / engagements as f32
        }
    }
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "K: {} | D: {} | HS: {} | Score: {}",
            self.kills, self.deaths, self.headshots, self.score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events() {
        let mut stats = MatchStats::default();
        assert_eq!(stats.kill_rate(), 0.5);

        stats.record(MatchEvent::Kill { headshot: true });
        stats.record(MatchEvent::Kill { headshot: false });
        stats.record(MatchEvent::Kill { headshot: false });
        stats.record(MatchEvent::Death);

        assert_eq!(stats.kills, 3);
        assert_eq!(stats.deaths, 1);
        assert_eq!(stats.headshots, 1);
        assert_eq!(stats.score, 3 * KILL_POINTS);
        assert!((stats.kill_rate() - 0.75).abs() < f32::EPSILON);
    }
}
