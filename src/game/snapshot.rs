//! Snapshot building for one requesting player

use serde::Serialize;

use crate::util::time::Tick;

use super::combat::{ItemKind, ItemStatus};
use super::player::HOTBAR_SIZE;
use super::projectile::ProjectileKind;
use super::world::World;
use super::{chebyshev, GridPos};

/// One drawable thing. Serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderObject {
    Projectile {
        name: ProjectileKind,
        pos: GridPos,
    },
    Item {
        name: ItemKind,
        pos: GridPos,
        status: ItemStatus,
    },
    Player {
        color: String,
        pos: GridPos,
    },
}

/// The view returned to one player
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Requester's grid position
    pub pos: GridPos,
    pub hotbar: [Option<ItemKind>; HOTBAR_SIZE],
    /// Back to front: projectiles, loose items, players, carried items
    pub objects: Vec<RenderObject>,
}

/// Builds snapshots for network transmission
pub struct SnapshotBuilder {
    /// Chebyshev view radius; `None` shows the whole map
    view_radius: Option<i32>,
}

impl SnapshotBuilder {
    pub fn new(view_radius: i32) -> Self {
        Self {
            view_radius: (view_radius >= 0).then_some(view_radius),
        }
    }

    /// Build the snapshot for `requester`, or `None` if they are not alive
    pub fn build(&self, world: &World, requester: &str, now: Tick) -> Option<Snapshot> {
        let player = world.player(requester)?;
        let visible = |pos: GridPos| {
            self.view_radius
                .map_or(true, |radius| chebyshev(pos, player.pos) <= radius)
        };

        let mut objects: Vec<RenderObject> = world
            .projectiles()
            .iter()
            .map(|p| (p.kind, p.position(now)))
            .filter(|(_, pos)| visible(*pos))
            .map(|(name, pos)| RenderObject::Projectile { name, pos })
            .collect();

        let mut front = Vec::new();
        for item in world.items().iter().filter(|item| visible(item.pos)) {
            let object = RenderObject::Item {
                name: item.kind,
                pos: item.pos,
                status: item.status(now),
            };
            if item.is_owned() {
                front.push(object);
            } else {
                objects.push(object);
            }
        }

        objects.extend(
            world
                .players()
                .filter(|p| visible(p.pos))
                .map(|p| RenderObject::Player {
                    color: p.color.clone(),
                    pos: p.pos,
                }),
        );
        objects.append(&mut front);

        Some(Snapshot {
            pos: player.pos,
            hotbar: player
                .hotbar
                .map(|slot| slot.and_then(|id| world.item(id)).map(|item| item.kind)),
            objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::tests::{give, place, test_world};
    use crate::game::Intent;

    fn layer(object: &RenderObject) -> u8 {
        match object {
            RenderObject::Projectile { .. } => 0,
            RenderObject::Item { .. } => 1,
            RenderObject::Player { .. } => 2,
        }
    }

    #[test]
    fn unknown_requester_gets_nothing() {
        let world = test_world(20, 4);
        assert!(world.snapshot("nobody", 1).is_none());
    }

    #[test]
    fn objects_are_ordered_back_to_front() {
        let mut world = test_world(40, 4);
        let a = world.join(100).unwrap().name;
        let b = world.join(100).unwrap().name;
        place(&mut world, &a, (10, 10));
        place(&mut world, &b, (30, 30));
        give(&mut world, &a, ItemKind::Pistol);
        give(&mut world, &b, ItemKind::Ar);

        let fire = Intent::from_wire(a.clone(), Some(0.0), &["use"], &[true]);
        world.apply_intent(&fire, 101);

        let snapshot = world.snapshot(&a, 101).unwrap();
        assert_eq!(snapshot.pos, (10, 10));
        assert_eq!(snapshot.hotbar, [Some(ItemKind::Pistol), None, None, None]);

        let objects = &snapshot.objects;
        // 1 projectile + 8 loose items + 2 players + 2 carried items
        assert_eq!(objects.len(), 13);
        assert!(matches!(objects[0], RenderObject::Projectile { .. }));

        let layers: Vec<u8> = objects.iter().map(layer).collect();
        let players_at = layers.iter().position(|&l| l == 2).unwrap();
        assert!(layers[..players_at].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(&layers[players_at..players_at + 2], &[2, 2]);

        let carried = &objects[players_at + 2..];
        assert_eq!(carried.len(), 2);
        assert!(carried.iter().all(|o| matches!(o, RenderObject::Item { .. })));
        assert!(carried.contains(&RenderObject::Item {
            name: ItemKind::Pistol,
            pos: (10, 9),
            status: ItemStatus::Firing,
        }));
    }

    #[test]
    fn view_radius_hides_distant_objects() {
        let mut world = test_world(40, 4);
        let a = world.join(100).unwrap().name;
        let b = world.join(100).unwrap().name;
        place(&mut world, &a, (5, 5));
        place(&mut world, &b, (35, 35));

        let snapshot = SnapshotBuilder::new(3).build(&world, &a, 100).unwrap();
        let players: Vec<&RenderObject> = snapshot
            .objects
            .iter()
            .filter(|o| matches!(o, RenderObject::Player { .. }))
            .collect();
        assert_eq!(players.len(), 1);
        assert!(snapshot.objects.iter().all(|o| {
            let pos = match o {
                RenderObject::Projectile { pos, .. }
                | RenderObject::Item { pos, .. }
                | RenderObject::Player { pos, .. } => *pos,
            };
            chebyshev(pos, (5, 5)) <= 3
        }));
    }

    #[test]
    fn wire_shape_matches_client_contract() {
        let mut world = test_world(20, 4);
        let a = world.join(100).unwrap().name;
        place(&mut world, &a, (4, 4));
        give(&mut world, &a, ItemKind::Grenade);

        let snapshot = SnapshotBuilder::new(0).build(&world, &a, 100).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["pos"], serde_json::json!([4, 4]));
        assert_eq!(json["hotbar"], serde_json::json!(["grenade", null, null, null]));

        let player = json["objects"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| o["type"] == "player")
            .unwrap();
        assert_eq!(player["pos"], serde_json::json!([4, 4]));
        assert!(player["color"].as_str().unwrap().starts_with('#'));

        let projectile = serde_json::to_value(RenderObject::Projectile {
            name: ProjectileKind::GrenadeLit,
            pos: (1, 2),
        })
        .unwrap();
        assert_eq!(
            projectile,
            serde_json::json!({ "type": "projectile", "name": "grenadeLit", "pos": [1, 2] })
        );

        let item = serde_json::to_value(RenderObject::Item {
            name: ItemKind::Smg,
            pos: (0, 0),
            status: ItemStatus::Reloading,
        })
        .unwrap();
        assert_eq!(
            item,
            serde_json::json!({ "type": "item", "name": "smg", "pos": [0, 0], "status": "reloading" })
        );
    }
}
