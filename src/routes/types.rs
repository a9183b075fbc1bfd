//! Route definitions, route status and the result of a route exploration.

use crate::battle::route_health;
use crate::catching::CatchReport;
use crate::core::{GameError, GameResult};
use crate::requirements::{RequirementSpec, RequirementTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub region: u32,
    pub number: u32,
    /// Position in the region's progression; drives egg steps per battle.
    #[serde(default)]
    pub order_number: f64,
    #[serde(default)]
    pub custom_health: Option<u64>,
    #[serde(default)]
    pub land_pokemon: Vec<String>,
    #[serde(default)]
    pub water_pokemon: Vec<String>,
    #[serde(default)]
    pub headbutt_pokemon: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<RequirementSpec>,
}

impl RouteData {
    pub fn health(&self) -> u64 {
        self.custom_health
            .unwrap_or_else(|| route_health(self.number, self.region))
    }

    /// Species met while walking the route. Water and headbutt pools need
    /// tools the player doesn't have here.
    pub fn encounter_pool(&self) -> &[String] {
        &self.land_pokemon
    }

    /// Every species that can appear on the route, deduplicated.
    pub fn all_pokemon(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let pools = [&self.land_pokemon, &self.water_pokemon, &self.headbutt_pokemon];
        for name in pools.into_iter().flatten() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn requirement_tree(&self) -> GameResult<RequirementTree> {
        RequirementTree::from_specs(&self.requirements)
    }
}

/// Route catalog ordered by region, then order number.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<RouteData>,
    by_id: HashMap<u32, usize>,
}

impl RouteCatalog {
    pub fn new(mut routes: Vec<RouteData>) -> Self {
        routes.sort_by(|a, b| {
            a.region
                .cmp(&b.region)
                .then(a.order_number.total_cmp(&b.order_number))
        });
        let by_id = routes.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self { routes, by_id }
    }

    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let routes: Vec<RouteData> = serde_json::from_str(json)
            .map_err(|e| GameError::Validation(format!("route data: {e}")))?;
        Ok(Self::new(routes))
    }

    pub fn by_id(&self, id: u32) -> Option<&RouteData> {
        self.by_id.get(&id).map(|&i| &self.routes[i])
    }

    pub fn require(&self, id: u32) -> GameResult<&RouteData> {
        self.by_id(id).ok_or_else(|| GameError::not_found("route", id))
    }

    pub fn in_region(&self, region: u32) -> impl Iterator<Item = &RouteData> {
        self.routes.iter().filter(move |r| r.region == region)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Route status, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Locked,
    Incomplete,
    UncaughtPokemon,
    UncaughtShiny,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteExploreResult {
    pub route_id: u32,
    pub encounters: u32,
    pub defeated: u64,
    pub money: u64,
    pub exp: u64,
    pub catches: Vec<CatchReport>,
    pub shiny_encounters: u32,
    pub level_ups: usize,
    pub egg_steps: u64,
    pub total_kills: u64,
}

impl RouteExploreResult {
    pub fn caught(&self) -> impl Iterator<Item = &CatchReport> {
        self.catches.iter().filter(|c| c.caught())
    }
}
