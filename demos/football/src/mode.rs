//! Football game mode.
//!
//! Two teams, one kickable ball, a goal zone at each end of the pitch, and
//! a floating scoreboard. Players pick a team by walking into a join zone;
//! scoring resets the ball to the center spot. When the last player leaves,
//! the match resets for the next arrivals.

use glam::Vec3;
use tracing::info;

use game_core::component::ComponentKind;
use game_core::components::{
    ColorTint, PhysicsBody, Position, ProximityPrompt, Rotation, Size, Team, Text,
};
use game_core::entity::EntityId;
use game_core::event::{ComponentEventKind, EventSystem, GameEvent, MessageScope};
use game_server::{ScriptCtx, TickLoop};

const BALL_SPAWN: Vec3 = Vec3::new(0.0, 1.4, 0.0);
const BALL_RADIUS: f32 = 1.4;
/// Horizontal impulse applied to the ball on a kick.
const KICK_IMPULSE: f32 = 15.0;

const RED_TEAM: u32 = 1;
const BLUE_TEAM: u32 = 2;
const RED_COLOR: &str = "#f0513c";
const BLUE_COLOR: &str = "#3c9cf0";

const ANNOUNCER: &str = "⚽";

/// An axis-aligned server-side trigger volume.
#[derive(Debug, Clone, Copy)]
struct Zone {
    center: Vec3,
    half_extent: Vec3,
}

impl Zone {
    const fn new(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        (point - self.center).abs().cmplt(self.half_extent).all()
    }
}

struct Football {
    ball: EntityId,
    scoreboard: EntityId,
    chat_entity: EntityId,
    red_score: u32,
    blue_score: u32,
    /// Ball entering the red goal scores for blue, and vice versa.
    red_goal: Zone,
    blue_goal: Zone,
    red_join: Zone,
    blue_join: Zone,
    had_players: bool,
}

/// Build the pitch and register the mode's tick hook on `server`.
pub fn install(server: &mut TickLoop) {
    let chat_entity = server.chat_entity();
    let mut mode = {
        let mut world = server.world();
        let ball = spawn_ball(&mut world);
        let scoreboard = spawn_scoreboard(&mut world);
        Football {
            ball,
            scoreboard,
            chat_entity,
            red_score: 0,
            blue_score: 0,
            red_goal: Zone::new(Vec3::new(-60.0, 2.0, 0.0), Vec3::new(3.0, 5.0, 8.0)),
            blue_goal: Zone::new(Vec3::new(60.0, 2.0, 0.0), Vec3::new(3.0, 5.0, 8.0)),
            red_join: Zone::new(Vec3::new(-12.0, 2.0, 20.0), Vec3::new(6.0, 3.0, 6.0)),
            blue_join: Zone::new(Vec3::new(12.0, 2.0, 20.0), Vec3::new(6.0, 3.0, 6.0)),
            had_players: false,
        }
    };

    {
        let mut world = server.world();
        mode.send_global_chat(&mut world, "Football! Walk into a zone to join a team.");
        mode.refresh_scoreboard(&mut world);
    }

    info!(ball = %mode.ball, "football mode installed");
    server.set_hook(Box::new(move |dt, ctx| mode.update(dt, ctx)));
}

fn spawn_ball(ctx: &mut ScriptCtx<'_>) -> EntityId {
    let ball = ctx.entities.create_entity();
    let handle = ctx.physics.create_body(ball, BALL_SPAWN);
    ctx.entities.add_component(
        ball,
        Position::new(BALL_SPAWN.x, BALL_SPAWN.y, BALL_SPAWN.z).into(),
        ctx.events,
    );
    ctx.entities
        .add_component(ball, Rotation::identity().into(), ctx.events);
    ctx.entities.add_component(
        ball,
        Size::new(BALL_RADIUS * 2.0, BALL_RADIUS * 2.0, BALL_RADIUS * 2.0).into(),
        ctx.events,
    );
    ctx.entities
        .add_component(ball, ColorTint::new("#ffffff").into(), ctx.events);
    ctx.entities.add_component(
        ball,
        ProximityPrompt::new("Kick", 10.0, 2000).into(),
        ctx.events,
    );
    ctx.entities
        .add_component(ball, PhysicsBody::new(handle).into(), ctx.events);
    ball
}

fn spawn_scoreboard(ctx: &mut ScriptCtx<'_>) -> EntityId {
    let board = ctx.entities.create_entity();
    ctx.entities
        .add_component(board, Position::new(0.0, 10.0, -15.0).into(), ctx.events);
    ctx.entities.add_component(
        board,
        Text::new("🔴 0 - 0 🔵", 0.0, 200.0).into(),
        ctx.events,
    );
    board
}

impl Football {
    fn update(&mut self, _dt: f64, ctx: &mut ScriptCtx<'_>) {
        self.greet_new_players(ctx);
        self.handle_kicks(ctx);
        self.handle_join_zones(ctx);
        self.handle_goals(ctx);
        self.reset_when_empty(ctx);
    }

    /// Point arriving players at the join zones.
    fn greet_new_players(&self, ctx: &mut ScriptCtx<'_>) {
        let arrivals: Vec<EntityId> = ctx
            .events
            .component_events(ComponentEventKind::Added, ComponentKind::Player)
            .collect();
        for player in arrivals {
            send_message(
                ctx.events,
                self.chat_entity,
                "⚽ Welcome to Football!",
                "Choose a team to get started",
                MessageScope::TargetedNotification,
                vec![player],
            );
        }
    }

    /// A validated prompt interaction on the ball kicks it along the
    /// player's facing direction.
    fn handle_kicks(&self, ctx: &mut ScriptCtx<'_>) {
        let kickers: Vec<EntityId> = ctx
            .events
            .events()
            .iter()
            .filter_map(|ev| match ev {
                GameEvent::ProximityInteract { prompt, player } if *prompt == self.ball => {
                    Some(*player)
                }
                _ => None,
            })
            .collect();

        for player in kickers {
            let Some(rotation) = ctx.entities.entity(player).and_then(|e| e.rotation()) else {
                continue;
            };
            let forward = rotation.quat * Vec3::NEG_Z;
            let impulse = Vec3::new(forward.x, 0.0, forward.z) * KICK_IMPULSE;

            if let Some(body) = ctx.entities.entity(self.ball).and_then(|e| e.physics_body()) {
                ctx.physics.apply_impulse(body.handle, impulse);
            }
            send_message(
                ctx.events,
                self.chat_entity,
                ANNOUNCER,
                "You kicked the ball!",
                MessageScope::TargetedNotification,
                vec![player],
            );
        }
    }

    /// Assign players standing in a join zone to that zone's team.
    fn handle_join_zones(&mut self, ctx: &mut ScriptCtx<'_>) {
        for player in ctx.entities.entities_with(ComponentKind::Player) {
            let Some(position) = ctx
                .entities
                .entity(player)
                .and_then(|e| e.position())
                .map(|p| p.coords)
            else {
                continue;
            };
            if self.red_join.contains(position) {
                self.join_team(ctx, player, RED_TEAM);
            } else if self.blue_join.contains(position) {
                self.join_team(ctx, player, BLUE_TEAM);
            }
        }
    }

    fn join_team(&mut self, ctx: &mut ScriptCtx<'_>, player: EntityId, team_id: u32) {
        let already_on_team = ctx
            .entities
            .entity(player)
            .and_then(|e| e.team())
            .is_some_and(|t| t.team_id == team_id);
        if already_on_team {
            return;
        }

        let (team_name, color, spawn_x, emoji) = if team_id == RED_TEAM {
            ("Red", RED_COLOR, -40.0, "🔴")
        } else {
            ("Blue", BLUE_COLOR, 40.0, "🔵")
        };

        ctx.entities.add_component(
            player,
            Team::new(team_id, team_name, color).into(),
            ctx.events,
        );
        ctx.events.add_event(GameEvent::ColorChange {
            entity: player,
            color: color.to_string(),
        });

        // Teleport to the team's end of the pitch, standing still.
        if let Some(body) = ctx.entities.entity(player).and_then(|e| e.physics_body()) {
            let handle = body.handle;
            ctx.physics.translate(handle, Vec3::new(spawn_x, 2.0, 0.0));
            ctx.physics.set_velocity(handle, Vec3::ZERO);
        }

        let name = ctx
            .entities
            .entity(player)
            .and_then(|e| e.player())
            .map_or_else(|| "Player".to_string(), |p| p.name.clone());
        send_message(
            ctx.events,
            self.chat_entity,
            &format!("{emoji} New Player"),
            &format!("{name} joined the {team_name} team"),
            MessageScope::GlobalNotification,
            Vec::new(),
        );
    }

    fn handle_goals(&mut self, ctx: &mut ScriptCtx<'_>) {
        let Some(ball_pos) = ctx
            .entities
            .entity(self.ball)
            .and_then(|e| e.position())
            .map(|p| p.coords)
        else {
            return;
        };

        let scorer = if self.red_goal.contains(ball_pos) {
            Some(("Blue 🔵", &mut self.blue_score))
        } else if self.blue_goal.contains(ball_pos) {
            Some(("Red 🔴", &mut self.red_score))
        } else {
            None
        };
        let Some((team_label, score)) = scorer else {
            return;
        };
        *score += 1;

        send_message(
            ctx.events,
            self.chat_entity,
            "⚽ GOAL!",
            &format!("{team_label} team scores!"),
            MessageScope::GlobalNotification,
            Vec::new(),
        );
        self.send_global_chat(ctx, &format!("{team_label} team scores! 🎉"));
        self.refresh_scoreboard(ctx);
        self.reset_ball(ctx);
    }

    /// Reset the match once the last player has left.
    fn reset_when_empty(&mut self, ctx: &mut ScriptCtx<'_>) {
        let has_players = !ctx.entities.entities_with(ComponentKind::Player).is_empty();
        if has_players {
            self.had_players = true;
            return;
        }
        if !self.had_players {
            return;
        }
        self.had_players = false;

        info!("no players left, resetting match");
        self.red_score = 0;
        self.blue_score = 0;
        self.refresh_scoreboard(ctx);
        self.reset_ball(ctx);
    }

    fn reset_ball(&self, ctx: &mut ScriptCtx<'_>) {
        if let Some(body) = ctx.entities.entity(self.ball).and_then(|e| e.physics_body()) {
            let handle = body.handle;
            ctx.physics.translate(handle, BALL_SPAWN);
            ctx.physics.set_rotation(handle, glam::Quat::IDENTITY);
            ctx.physics.set_velocity(handle, Vec3::ZERO);
        }
    }

    fn refresh_scoreboard(&self, ctx: &mut ScriptCtx<'_>) {
        let line = format!("🔴 {} - {} 🔵", self.red_score, self.blue_score);
        if let Some(text) = ctx
            .entities
            .entity_mut(self.scoreboard)
            .and_then(|e| e.text_mut())
        {
            text.set_text(&line);
            ctx.events.add_event(GameEvent::ComponentUpdated {
                entity: self.scoreboard,
                kind: ComponentKind::Text,
            });
        }
        self.send_global_chat(ctx, &format!("Score: 🔴 Red {} - {} Blue 🔵", self.red_score, self.blue_score));
    }

    /// Append a line to the global chat backlog and broadcast it, the same
    /// shape inbound player chat takes.
    fn send_global_chat(&self, ctx: &mut ScriptCtx<'_>, content: &str) {
        if let Some(chat) = ctx
            .entities
            .entity_mut(self.chat_entity)
            .and_then(|e| e.chat_mut())
        {
            chat.add_message(ANNOUNCER, content);
            ctx.events.add_event(GameEvent::ComponentUpdated {
                entity: self.chat_entity,
                kind: ComponentKind::Chat,
            });
        }
        send_message(
            ctx.events,
            self.chat_entity,
            ANNOUNCER,
            content,
            MessageScope::GlobalChat,
            Vec::new(),
        );
    }
}

fn send_message(
    events: &mut EventSystem,
    chat_entity: EntityId,
    author: &str,
    content: &str,
    scope: MessageScope,
    targets: Vec<EntityId>,
) {
    events.add_event(GameEvent::Message {
        entity: chat_entity,
        author: author.to_string(),
        content: content.to_string(),
        scope,
        targets,
    });
}
