//! Faction state every rule may read besides the candidate and the snapshot

use ahash::AHashSet;

use super::mode::{FactionMode, Posture, Protocol};
use super::snapshot::GameSnapshot;
use super::strength::{RelativeStrength, StrengthClassifier};
use crate::core::types::{HexCoord, PlayerId};

/// Read-only decision context handed to every predicate
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub mode: FactionMode,
    pub strengths: &'a StrengthClassifier,
    pub claimed_tiles: &'a AHashSet<HexCoord>,
    /// Standing building count on the previous turn, if there was one
    pub previous_building_count: Option<usize>,
    pub target_population: u32,
}

impl<'a> DecisionContext<'a> {
    pub fn protocol(&self) -> Protocol {
        self.mode.protocol
    }

    pub fn posture(&self) -> Posture {
        self.mode.posture
    }

    pub fn is_claimed(&self, tile: HexCoord) -> bool {
        self.claimed_tiles.contains(&tile)
    }

    pub fn strength_of(&self, opponent: PlayerId) -> RelativeStrength {
        self.strengths.get(opponent)
    }

    /// Did the faction lose buildings since the previous turn?
    pub fn lost_buildings(&self, snapshot: &GameSnapshot) -> bool {
        self.previous_building_count
            .is_some_and(|previous| previous > snapshot.building_count())
    }
}

/// Tiles within `claiming_distance` of any standing own building
pub fn claimed_tiles(snapshot: &GameSnapshot, claiming_distance: u32) -> AHashSet<HexCoord> {
    snapshot
        .standing_buildings()
        .flat_map(|b| b.position.within(claiming_distance).collect::<Vec<_>>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::snapshot::BuildingView;
    use crate::core::types::BuildingId;
    use crate::world::{BuildingState, BuildingType};

    fn snapshot_with_buildings(positions: &[(HexCoord, BuildingState)]) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new(PlayerId(1));
        for (i, (position, state)) in positions.iter().enumerate() {
            snapshot.buildings.push(BuildingView {
                id: BuildingId(i as u32),
                building_type: BuildingType::Hut,
                state: *state,
                defensive_value: 2,
                position: *position,
            });
        }
        snapshot
    }

    #[test]
    fn test_claimed_tiles_cover_radius() {
        let snapshot = snapshot_with_buildings(&[(HexCoord::new(0, 0), BuildingState::Active)]);
        let claimed = claimed_tiles(&snapshot, 2);

        assert_eq!(claimed.len(), 19);
        assert!(claimed.contains(&HexCoord::new(2, -2)));
        assert!(!claimed.contains(&HexCoord::new(3, 0)));
    }

    #[test]
    fn test_destroyed_buildings_claim_nothing() {
        let snapshot = snapshot_with_buildings(&[
            (HexCoord::new(0, 0), BuildingState::Destroyed),
            (HexCoord::new(10, 0), BuildingState::UnderConstruction),
        ]);
        let claimed = claimed_tiles(&snapshot, 1);

        assert!(!claimed.contains(&HexCoord::new(0, 0)));
        assert!(claimed.contains(&HexCoord::new(10, 0)));
    }

    #[test]
    fn test_lost_buildings() {
        let strengths = StrengthClassifier::new(PlayerId(1));
        let claimed = AHashSet::new();
        let snapshot = snapshot_with_buildings(&[(HexCoord::new(0, 0), BuildingState::Active)]);
        let mut ctx = DecisionContext {
            mode: FactionMode::default(),
            strengths: &strengths,
            claimed_tiles: &claimed,
            previous_building_count: None,
            target_population: 10,
        };
        assert!(!ctx.lost_buildings(&snapshot));

        ctx.previous_building_count = Some(2);
        assert!(ctx.lost_buildings(&snapshot));
    }
}
