//! Status components: health, score, and team assignment.

use serde::{Deserialize, Serialize};

/// Hit points for any entity that can take damage: players, enemies,
/// destructible props.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Health {
    /// Current hit points, clamped to `0..=max_health`.
    pub health: i32,
    /// Maximum hit points.
    pub max_health: i32,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Health {
    #[must_use]
    pub fn new(health: i32, max_health: i32) -> Self {
        Self {
            health,
            max_health,
            updated: true,
        }
    }

    /// Apply damage, clamped at zero.
    pub fn damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
        self.updated = true;
    }

    /// Restore health, clamped at `max_health`.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
        self.updated = true;
    }

    /// True once health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Accumulated points for an entity, whatever the game mode counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Score {
    pub score: i64,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Score {
    #[must_use]
    pub fn new(score: i64) -> Self {
        Self {
            score,
            updated: true,
        }
    }

    /// Add points (may be negative).
    pub fn add(&mut self, amount: i64) {
        self.score += amount;
        self.updated = true;
    }

    /// Reset the score to zero.
    pub fn reset(&mut self) {
        self.score = 0;
        self.updated = true;
    }
}

/// Team assignment for an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub team_id: u32,
    pub team_name: String,
    /// Hex color string, e.g. `"#f0513c"`.
    pub team_color: String,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Team {
    #[must_use]
    pub fn new(team_id: u32, team_name: impl Into<String>, team_color: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            team_color: team_color.into(),
            updated: true,
        }
    }

    /// Reassign the entity to another team.
    pub fn assign(&mut self, team_id: u32, team_name: impl Into<String>, team_color: impl Into<String>) {
        self.team_id = team_id;
        self.team_name = team_name.into();
        self.team_color = team_color.into();
        self.updated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero_and_flags_death() {
        let mut health = Health::new(100, 100);
        health.updated = false;

        health.damage(30);
        health.damage(30);
        assert_eq!(health.health, 40);
        assert!(health.updated);
        assert!(!health.is_dead());

        health.damage(1000);
        assert_eq!(health.health, 0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut health = Health::new(50, 100);
        health.heal(200);
        assert_eq!(health.health, 100);
        assert!(health.updated);
    }

    #[test]
    fn test_score_add_and_reset() {
        let mut score = Score::new(0);
        score.updated = false;
        score.add(7);
        score.add(3);
        assert_eq!(score.score, 10);
        assert!(score.updated);
        score.reset();
        assert_eq!(score.score, 0);
    }

    #[test]
    fn test_team_assign_marks_dirty() {
        let mut team = Team::new(0, "", "#FFFFFF");
        team.updated = false;
        team.assign(1, "red", "#f0513c");
        assert!(team.updated);
        assert_eq!(team.team_name, "red");
    }
}
