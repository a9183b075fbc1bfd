use crate::pokemon::{OwnedPokemon, PokemonSpecies, SpeciesCatalog, TypePair};
use serde::{Deserialize, Serialize};

/// One attacker as seen by the battle formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyMember {
    pub attack: u64,
    pub types: TypePair,
}

impl PartyMember {
    pub fn from_owned(pokemon: &OwnedPokemon, species: &PokemonSpecies) -> Self {
        Self {
            attack: pokemon.attack(species.base_attack),
            types: species.types,
        }
    }
}

/// Party members with known species. Unknown species are left out.
pub fn party_members(party: &[OwnedPokemon], catalog: &SpeciesCatalog) -> Vec<PartyMember> {
    party
        .iter()
        .filter_map(|p| {
            catalog
                .by_id(p.species_id)
                .map(|species| PartyMember::from_owned(p, species))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonBattleResult {
    pub enemy_name: String,
    pub defeated: bool,
    pub damage_dealt: u64,
    pub ticks_to_defeat: u64,
    pub exp_earned: u64,
    pub is_boss: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstClearBonus {
    pub tokens: u64,
    pub money: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DungeonRewards {
    pub money: u64,
    pub exp: u64,
    pub dungeon_tokens: u64,
    pub first_clear_bonus: Option<FirstClearBonus>,
}

impl DungeonRewards {
    pub fn total_money(&self) -> u64 {
        self.money + self.first_clear_bonus.map_or(0, |b| b.money)
    }

    pub fn total_tokens(&self) -> u64 {
        self.dungeon_tokens + self.first_clear_bonus.map_or(0, |b| b.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::PokemonType;

    #[test]
    fn test_reward_totals_include_bonus() {
        let mut rewards = DungeonRewards {
            money: 100,
            exp: 0,
            dungeon_tokens: 10,
            first_clear_bonus: None,
        };
        assert_eq!(rewards.total_money(), 100);
        rewards.first_clear_bonus = Some(FirstClearBonus {
            tokens: 50,
            money: 200,
        });
        assert_eq!(rewards.total_money(), 300);
        assert_eq!(rewards.total_tokens(), 60);
    }

    #[test]
    fn test_party_member_from_owned() {
        let species = PokemonSpecies {
            id: 4,
            name: "Charmander".to_string(),
            types: TypePair::single(PokemonType::Fire),
            catch_rate: 45,
            base_attack: 52,
            base_exp: 62,
            egg_cycles: 20,
        };
        let member = PartyMember::from_owned(&OwnedPokemon::new(4, false), &species);
        assert_eq!(member.attack, 52);
        assert_eq!(member.types, species.types);
    }

    #[test]
    fn test_party_members_skip_unknown_species() {
        let catalog = SpeciesCatalog::new(vec![PokemonSpecies {
            id: 7,
            name: "Squirtle".to_string(),
            types: TypePair::single(PokemonType::Water),
            catch_rate: 45,
            base_attack: 48,
            base_exp: 63,
            egg_cycles: 20,
        }]);
        let party = vec![OwnedPokemon::new(7, false), OwnedPokemon::new(999, false)];
        let members = party_members(&party, &catalog);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].attack, 48);
    }
}
