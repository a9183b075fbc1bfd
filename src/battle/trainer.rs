//! Dungeon trainer fights: a team beaten in order, one Pokémon at a time.

use super::logic::{boss_health, simulate_dungeon_battle, trainer_pokemon_health};
use super::types::DungeonBattleResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerPokemon {
    pub name: String,
    pub level: u32,
    /// Predefined health, only used for boss trainers.
    pub health: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonTrainer {
    pub trainer_class: String,
    pub name: Option<String>,
    pub team: Vec<TrainerPokemon>,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default = "default_trainer_weight")]
    pub weight: f64,
}

fn default_trainer_weight() -> f64 {
    1.0
}

impl DungeonTrainer {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.trainer_class, name),
            None => self.trainer_class.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerBattleState {
    pub trainer_class: String,
    pub trainer_name: Option<String>,
    pub team: Vec<TrainerPokemon>,
    pub current_index: usize,
    pub is_boss: bool,
}

impl TrainerBattleState {
    pub fn new(trainer: &DungeonTrainer) -> Self {
        Self {
            trainer_class: trainer.trainer_class.clone(),
            trainer_name: trainer.name.clone(),
            team: trainer.team.clone(),
            current_index: 0,
            is_boss: trainer.is_boss,
        }
    }

    pub fn current(&self) -> Option<&TrainerPokemon> {
        self.team.get(self.current_index)
    }

    pub fn all_defeated(&self) -> bool {
        self.current_index >= self.team.len()
    }

    /// Health of a team member: boss trainers use their own numbers, regular
    /// trainers split the dungeon's base health across the team.
    pub fn member_health(&self, member: &TrainerPokemon, base_health: u64, chests: u32) -> u64 {
        if self.is_boss {
            boss_health(member.health, chests)
        } else {
            trainer_pokemon_health(base_health, chests, false, self.team.len())
        }
    }

    /// Fights the remaining team in order and returns one result per member.
    pub fn simulate(
        &mut self,
        party_attack: u64,
        base_health: u64,
        chests: u32,
        click_multiplier: f64,
    ) -> Vec<DungeonBattleResult> {
        let mut results = Vec::with_capacity(self.team.len());
        while let Some(member) = self.current() {
            let health = self.member_health(member, base_health, chests);
            results.push(simulate_dungeon_battle(
                &member.name,
                health,
                party_attack,
                click_multiplier,
                self.is_boss,
            ));
            self.current_index += 1;
        }
        results
    }
}
