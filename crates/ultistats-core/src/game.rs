// A game: the two teams' event tables for the same sequence of points.

use crate::event::EventTable;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game {game}: a table names no opponent")]
    MissingOpponent { game: String },

    #[error("game {game}: both tables name the same opponent `{team}`")]
    SameOpponent { game: String, team: String },
}

/// One team's log of a game.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamLog {
    pub team: String,
    pub table: EventTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: String,
    pub sides: [TeamLog; 2],
}

impl Game {
    /// Pair two tables into a game. Each table's team is the opponent named
    /// by the other table.
    pub fn from_tables(
        id: impl Into<String>,
        first: EventTable,
        second: EventTable,
    ) -> Result<Self, GameError> {
        let id = id.into();
        let (Some(first_team), Some(second_team)) = (second.opponent(), first.opponent()) else {
            return Err(GameError::MissingOpponent { game: id });
        };
        if first_team == second_team {
            return Err(GameError::SameOpponent {
                team: first_team.to_string(),
                game: id,
            });
        }
        let first_team = first_team.to_string();
        let second_team = second_team.to_string();

        Ok(Game {
            id,
            sides: [
                TeamLog {
                    team: first_team,
                    table: first,
                },
                TeamLog {
                    team: second_team,
                    table: second,
                },
            ],
        })
    }

    /// Each side paired with the side it played against.
    pub fn matchups(&self) -> impl Iterator<Item = (&TeamLog, &TeamLog)> {
        let [first, second] = &self.sides;
        [(first, second), (second, first)].into_iter()
    }
}
