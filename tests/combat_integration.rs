//! Combat resolution integration tests

use hexfront::combat::*;
use hexfront::core::config::RulesConfig;
use hexfront::core::error::CombatError;
use hexfront::core::types::Partnership;
use hexfront::map::{Hex, HexCoord, MapSheet, Terrain};
use hexfront::scenario::{LandScenario, DEFENDED_HEX, STAGING_HEX};
use hexfront::units::{NavalClass, UnitKind};
use hexfront::world::World;
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const EPSILON: f64 = 1e-9;

#[test]
fn test_six_against_three_odds() {
    let built = LandScenario::default().build(RulesConfig::default()).unwrap();
    let (world, combat) = (&built.world, &built.combat);

    assert_eq!(combat.ratio(world), 2.0);
    assert!((combat.defender_loss_probability(world, 1) - 8.0 / 9.0).abs() < EPSILON);
    assert!((combat.attacker_loss_probability(world, 1) - 0.5).abs() < EPSILON);
    assert_eq!(combat.attacker_loss_probability(world, 4), 0.0);
    assert_eq!(combat.attacker_elimination_probability(world), 0.0);

    // The staging hex is occupied and its two neighbours are in the attacker's zone
    let retreats = combat.retreatable_hexes(world).unwrap();
    assert_eq!(retreats.len(), 3);
    for retreat in &retreats {
        let destination = retreat.destination(built.defenders[0]).unwrap();
        assert!(![STAGING_HEX, HexCoord::new(2, 1), HexCoord::new(1, 3)].contains(&destination));
    }

    // Losing all 3 points at c = 5/3
    let elimination = combat.defender_elimination_probability(world).unwrap();
    assert!((elimination - 0.64).abs() < EPSILON);
}

#[test]
fn test_unwilling_defender_needs_half_losses() {
    let scenario = LandScenario {
        willing_to_retreat: false,
        ..LandScenario::default()
    };
    let built = scenario.build(RulesConfig::default()).unwrap();
    let elimination = built.combat.defender_elimination_probability(&built.world).unwrap();
    assert!((elimination - 0.75).abs() < EPSILON);
}

#[test]
fn test_land_resolution_invariants() {
    for seed in 0..50 {
        let mut built = LandScenario::default().build(RulesConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let CombatResult::Land(result) = built.combat.inflict_damages(&mut built.world, &mut rng).unwrap() else {
            panic!("land combat must produce a land result");
        };
        let world = &built.world;

        assert!(result.attacker_losses <= RulesConfig::default().max_attacker_loss);
        match &result.retreat {
            Some(retreat) => {
                assert!(result.defender_losses > 0);
                assert_eq!(retreat.len(), built.defenders.len());
            }
            None => assert_eq!(result.defender_losses % 2, 0),
        }

        // Every point lost comes back as a fragment
        let attacker_pool = world.country(built.attacker).unwrap().available_units.len() as u32;
        let defender_pool = world.country(built.defender).unwrap().available_units.len() as u32;
        assert_eq!(attacker_pool, result.attacker_losses);
        assert_eq!(defender_pool, result.defender_losses.min(3));

        let survivors: u32 = built
            .defenders
            .iter()
            .filter(|id| world.is_alive(**id))
            .map(|id| world.unit(*id).unwrap().strength())
            .sum();
        assert_eq!(survivors, 3 - result.defender_losses.min(3));
        if survivors > 0 && result.retreat.is_none() {
            assert_eq!(world.hex_of(built.defenders[0]), Some(DEFENDED_HEX));
        }
    }
}

#[test]
fn test_landing_then_land_combat() {
    let mut world = World::new(MapSheet::parse("~ ~ ~\n. . .\n. . ."));
    let usa = world.add_country("USA", Some(Partnership::Allies));
    let germany = world.add_country("Germany", Some(Partnership::Axis));
    let beach = HexCoord::new(1, 1);
    world.set_controller(beach, germany).unwrap();
    let defender = world.place(germany, UnitKind::infantry(2), beach).unwrap();
    let marines: Vec<_> = (0..2)
        .map(|_| world.place(usa, UnitKind::infantry(4), beach).unwrap())
        .collect();

    let mut rng = StepRng::new(0, 0);
    assert!(run_amphibious_paradrop(&mut world, &mut rng, &marines, &[]).unwrap());
    // The beach is still held, so it stays German
    assert_eq!(world.map.hex(&beach).unwrap().controller, Some(germany));

    let mut combat = LandCombat::new(&world, marines.clone(), vec![defender]).unwrap();
    assert!(combat.is_amphibious());

    let mut rng = ChaCha8Rng::seed_from_u64(44);
    let result = combat.inflict_damages(&mut world, &mut rng).unwrap();
    let defender_on_beach = world.hex_of(defender) == Some(beach);
    if defender_on_beach {
        assert!(marines.iter().all(|id| !world.is_alive(*id)));
        assert!(result.attacker_losses().unwrap() >= 8);
    } else if marines.iter().any(|id| world.is_alive(*id)) {
        assert_eq!(world.map.hex(&beach).unwrap().controller, Some(usa));
    }
}

#[test]
fn test_dogfight_reports_mission_result() {
    for seed in 0..30 {
        let mut world = World::new(MapSheet::parse("~ ~ ~\n~ ~ ~"));
        let japan = world.add_country("Japan", Some(Partnership::Axis));
        let usa = world.add_country("USA", Some(Partnership::Allies));
        let zeros: Vec<_> = (0..3)
            .map(|_| world.place(japan, UnitKind::air("A6M Zero", 3, 1, 3), HexCoord::new(0, 0)).unwrap())
            .collect();
        let dauntless = world.place(usa, UnitKind::air("SBD Dauntless", 1, 3, 2), HexCoord::new(1, 1)).unwrap();

        let mut combat = Combat::air_naval(&world, zeros, vec![dauntless]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let CombatResult::AirNaval(result) = combat.inflict_damages(&mut world, &mut rng).unwrap() else {
            panic!("air/naval combat must produce an air/naval result");
        };

        assert!(result.retreat.is_none());
        let canceled = result.mission_canceled.unwrap();
        if !world.is_alive(dauntless) {
            assert!(canceled);
            assert!(result.eliminated_units.contains(&dauntless));
        }
        assert!(result.damaged_units.is_disjoint(&result.eliminated_units));
    }
}

#[test]
fn test_sunk_carrier_returns_aircraft_to_pool() {
    let mut world = World::new(MapSheet::parse("~ ~ ~\n~ ~ ~"));
    let japan = world.add_country("Japan", Some(Partnership::Axis));
    let usa = world.add_country("USA", Some(Partnership::Allies));
    let yorktown = world
        .place(usa, UnitKind::naval("Yorktown", NavalClass::Carrier, 1, 0, 1), HexCoord::new(1, 1))
        .unwrap();
    let wildcat = world.place(usa, UnitKind::air("F4F Wildcat", 3, 1, 3), HexCoord::new(1, 1)).unwrap();
    world.embark(wildcat, yorktown).unwrap();
    let strike: Vec<_> = (0..4)
        .map(|_| world.place(japan, UnitKind::air("B5N Kate", 1, 10, 2), HexCoord::new(0, 0)).unwrap())
        .collect();

    let mut combat = AirNavalCombat::new(&world, strike, vec![yorktown]).unwrap();
    combat.kamikaze = true;
    // 4 x 30 against a single defense point
    assert!(combat.elimination_probability(&world, yorktown) > 0.99);

    // Every draw is 0.0, so every roll hits
    let mut rng = StepRng::new(0, 0);
    let result = combat.inflict_damages(&mut world, &mut rng).unwrap();
    assert!(result.eliminated_units().unwrap().contains(&yorktown));
    assert!(!world.is_alive(yorktown));
    assert!(!world.is_alive(wildcat));
    assert!(world.country(usa).unwrap().available_units.contains(&wildcat));
    // Kamikaze attackers never come back
    for id in combat.attackers() {
        assert!(!world.is_alive(*id));
    }
}

#[test]
fn test_sunk_transport_salvages_cargo() {
    let mut world = World::new(MapSheet::parse("~ ~ ~\n~ ~ ~"));
    let japan = world.add_country("Japan", Some(Partnership::Axis));
    let usa = world.add_country("USA", Some(Partnership::Allies));
    let lst = world
        .place(usa, UnitKind::naval("LST", NavalClass::TransportShip, 0, 0, 1), HexCoord::new(1, 1))
        .unwrap();
    let infantry = world.place(usa, UnitKind::infantry(3), HexCoord::new(1, 1)).unwrap();
    world.embark(infantry, lst).unwrap();
    let strike: Vec<_> = (0..2)
        .map(|_| world.place(japan, UnitKind::air("B5N Kate", 1, 10, 2), HexCoord::new(0, 0)).unwrap())
        .collect();

    let mut combat = AirNavalCombat::new(&world, strike, vec![lst]).unwrap();
    let mut rng = StepRng::new(0, 0);
    let result = combat.inflict_damages(&mut world, &mut rng).unwrap();

    assert!(result.eliminated_units().unwrap().contains(&lst));
    assert!(!world.is_alive(infantry));
    let pool = &world.country(usa).unwrap().available_units;
    // Three infantry fragments and the transport itself
    assert_eq!(pool.len(), 4);
    assert!(pool.contains(&lst));
}

struct Homeland {
    world: World,
    japan: hexfront::core::types::CountryId,
    usa: hexfront::core::types::CountryId,
    hiroshima: HexCoord,
    nagasaki: HexCoord,
}

fn homeland() -> Homeland {
    let mut world = World::new(MapSheet::new());
    let japan = world.add_country("Japan", Some(Partnership::Axis));
    let usa = world.add_country("USA", Some(Partnership::Allies));
    let hiroshima = HexCoord::new(0, 0);
    let nagasaki = HexCoord::new(1, 0);
    world
        .map
        .insert(Hex::new(hiroshima, Terrain::Clear).with_country(japan).with_city("Hiroshima"));
    let mut port = Hex::new(nagasaki, Terrain::Clear).with_country(japan).with_city("Nagasaki");
    port.is_resource_hex = true;
    world.map.insert(port);
    world.map.insert(Hex::new(HexCoord::new(0, 1), Terrain::Sea));
    world.map.update_coastal_flags();
    Homeland {
        world,
        japan,
        usa,
        hiroshima,
        nagasaki,
    }
}

#[test]
fn test_repeated_atomic_strikes_raise_surrender_odds() {
    let Homeland {
        mut world,
        japan,
        usa,
        hiroshima,
        nagasaki,
    } = homeland();
    let first = world.place(usa, UnitKind::air("B-29", 0, 1, 4), hiroshima).unwrap();
    let mut strike = Combat::atomic_bombing(&world, vec![first]).unwrap();
    let Combat::Bombing(bombing) = &strike else {
        panic!("atomic bombing must build a bombing");
    };
    let before = bombing.surrender_probability(&world);
    assert!((before - (1.0 - 2f64.powf(-0.5))).abs() < EPSILON);

    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let result = strike.inflict_damages(&mut world, &mut rng).unwrap();
    assert_eq!(result.success(), Some(true));
    assert_eq!(world.country(japan).unwrap().atomic_bomb_count, 1);
    assert_eq!(world.map.hex(&hiroshima).unwrap().airbase_capacity(), 0);

    let second = world.place(usa, UnitKind::air("B-29", 0, 1, 4), nagasaki).unwrap();
    let strike = Bombing::new(&world, BombingKind::Atomic, vec![second]).unwrap();
    assert!((strike.surrender_probability(&world) - 0.5).abs() < EPSILON);
    assert!(strike.surrender_probability(&world) > before);
}

#[test]
fn test_strategic_bombing_knocks_out_resources() {
    for seed in 0..20 {
        let Homeland {
            mut world,
            usa,
            nagasaki,
            ..
        } = homeland();
        let bombers: Vec<_> = (0..2)
            .map(|_| world.place(usa, UnitKind::air("B-17", 0, 5, 4), nagasaki).unwrap())
            .collect();
        let mut raid = Combat::strategic_bombing(&world, bombers.clone()).unwrap();
        // 10 modified strength against an even-odds strength of 5
        assert!((raid.modified_attack_strength(&world) - 10.0).abs() < EPSILON);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = raid.inflict_damages(&mut world, &mut rng).unwrap();
        let hex = world.map.hex(&nagasaki).unwrap();
        assert_eq!(result.success(), Some(hex.resource_hex_destroyed));
        assert!(!hex.installations_destroyed);

        let damaged = result.damaged_units().unwrap();
        assert!(damaged.len() <= 1);
        for id in damaged {
            assert!(bombers.contains(id));
            assert!(world.unit(*id).unwrap().damaged());
        }
    }
}

#[test]
fn test_combat_resolves_only_once() {
    let mut built = LandScenario::default().build(RulesConfig::default()).unwrap();
    let mut combat = Combat::Land(built.combat.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    assert!(!combat.is_resolved());
    combat.inflict_damages(&mut built.world, &mut rng).unwrap();
    assert!(combat.is_resolved());
    assert!(matches!(
        combat.inflict_damages(&mut built.world, &mut rng),
        Err(CombatError::AlreadyResolved)
    ));
}

#[test]
fn test_rules_from_toml_change_odds() {
    let rules = RulesConfig::from_toml_str("max_attacker_loss = 1\nland_loss_coefficient = 4.0\n").unwrap();
    let built = LandScenario::default().build(rules).unwrap();
    assert_eq!(built.combat.attacker_loss_probability(&built.world, 2), 0.0);
    // c = 4/1 + 1 at ratio 2
    let p = built.combat.defender_loss_probability(&built.world, 1);
    assert!((p - 24.0 / 25.0).abs() < EPSILON);
}
