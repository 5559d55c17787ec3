//! The gate-and-priest level: two rooms, one locked gate, one sermon.
//!
//! The hero is sent to the robot priest; hearing the sermon out opens the
//! north gate into the sanctum, where the goal waits. The same level ships
//! as a TOML file for the authoring pipeline tests.

use dungeon_world::{
    Conversation, ConversationPage, Direction, NpcDefinition, Position, RoomLayout, RoomTemplate,
};

use crate::events::{EventFilter, EventKind};
use crate::level::LevelBlueprint;
use crate::rules::{Action, Condition, HeroStrategy};
use crate::trigger::{StateMatch, Trigger};

pub const NAME: &str = "simple_gate";

fn hall_template(name: &str, art: &[&str]) -> RoomTemplate {
    RoomTemplate::new(name, art)
}

fn sermon() -> Conversation {
    Conversation::new(vec![
        ConversationPage::new("Robot Priest", "Welcome, wanderer, to the Church of the Gate."),
        ConversationPage::new("Robot Priest", "The gate opens for those who listen to the end.")
            .with_duration(5.0),
        ConversationPage::new("Robot Priest", "Go now. The sanctum waits below."),
    ])
}

/// Assemble a fresh blueprint for the gate level.
pub fn blueprint() -> LevelBlueprint {
    let nave = hall_template(
        "nave",
        &[
            "1-----2", //
            "[.....]",
            "[.....]",
            "[.....]",
            "3__s__4",
        ],
    );
    let sanctum = hall_template(
        "sanctum",
        &[
            "1--n--2", //
            "[.....]",
            "[.....]",
            "[.....]",
            "3_____4",
        ],
    );

    LevelBlueprint::new(NAME)
        .room(RoomLayout::new("nave", Position::new(0, 0), &nave).expect("static nave art"))
        .room(
            RoomLayout::new("sanctum", Position::new(5, 0), &sanctum)
                .expect("static sanctum art"),
        )
        .connect("nave", Direction::South, "sanctum", Direction::North)
        .npc(
            NpcDefinition::new("robot_priest", "nave", Position::new(2, 3), "robot_priest")
                .with_conversation(sermon()),
        )
        .npc(NpcDefinition::new(
            "north_gate",
            "nave",
            Position::new(3, 3),
            "north_gate",
        ))
        .state("start")
        .state("open")
        .initial_state("start")
        .spawn_room("nave")
        .trigger(
            Trigger::new(
                "seek the priest",
                StateMatch::in_state("start"),
                EventFilter::kind(EventKind::LevelStart),
            )
            .then(Action::SetHeroStrategy(HeroStrategy::NpcSeeking(
                "robot_priest".into(),
            ))),
        )
        .trigger(
            Trigger::new(
                "priest sermon",
                StateMatch::in_state("start"),
                EventFilter::kind(EventKind::NpcInteraction).with_npc("robot_priest"),
            )
            .when(Condition::FlagNotSet("gate_open".to_string()))
            .then(Action::ShowConversation(sermon())),
        )
        .trigger(
            Trigger::new(
                "open the gate",
                StateMatch::in_state("start"),
                EventFilter::kind(EventKind::ConversationEnd).with_npc("robot_priest"),
            )
            .when(Condition::FlagNotSet("gate_open".to_string()))
            .then(Action::SetFlag("gate_open".to_string()))
            .then(Action::RemoveNpc("north_gate".into()))
            .then(Action::PlaceGoal("sanctum".into()))
            .then(Action::SetHeroStrategy(HeroStrategy::GoalSeeking))
            .then(Action::TransitionTo("open".to_string())),
        )
        .trigger(
            Trigger::new(
                "reach the goal",
                StateMatch::in_state("open"),
                EventFilter::kind(EventKind::NpcInteraction).with_npc("goal"),
            )
            .then(Action::EndLevel),
        )
}
