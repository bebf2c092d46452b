//! Demo data seeding: plants a fixed set of topics spanning every growth
//! stage, laid out on a grid inside a square. Development tooling, handy in
//! tests and demos.

use tracing::debug;

use garden_world::{Position, SquareId, TopicId};

use crate::error::GardenError;
use crate::garden::Garden;

/// One representative engagement score per growth stage, in stage order.
pub const STAGE_SCORES: [i32; 5] = [5, 20, 45, 75, 92];

/// Demo topics covering every growth stage, two per stage.
const DEMO_TOPICS: [(&str, i32); 10] = [
    ("Getting Started", 5),
    ("First Concepts", 3),
    ("Basic Principles", 15),
    ("Key Definitions", 22),
    ("Core Theory", 40),
    ("Applied Methods", 52),
    ("Advanced Topics", 70),
    ("Deep Analysis", 78),
    ("Mastery Level", 90),
    ("Expert Knowledge", 95),
];

const GRID_COLS: usize = 5;
const GRID_PADDING_X: f32 = 300.0;
const GRID_PADDING_Y: f32 = 400.0;

/// Plant the ten demo topics in a square on a centered 5x2 grid, with
/// engagement scores spanning seedling through ancient.
pub fn seed_demo_topics(garden: &mut Garden, square_id: &SquareId) -> Result<Vec<TopicId>, GardenError> {
    let rows = DEMO_TOPICS.len().div_ceil(GRID_COLS);
    let config = garden.config().clone();

    let available_width = config.width - GRID_PADDING_X * 2.0;
    let available_height = config.height - GRID_PADDING_Y * 2.0;
    let spacing_x = available_width / (GRID_COLS - 1) as f32;
    let spacing_y = available_height / (rows - 1).max(1) as f32;

    let mut planted = Vec::with_capacity(DEMO_TOPICS.len());
    for (index, (name, score)) in DEMO_TOPICS.iter().enumerate() {
        let col = (index % GRID_COLS) as f32;
        let row = (index / GRID_COLS) as f32;
        let position = Position::new(
            GRID_PADDING_X + col * spacing_x,
            GRID_PADDING_Y + row * spacing_y,
        );

        let id = garden.add_topic(name, square_id, position)?;
        garden.update_engagement(id, *score)?;
        planted.push(id);
    }

    debug!(square = %square_id, count = planted.len(), "demo topics seeded");
    Ok(planted)
}

/// Re-score a square's existing topics so they showcase every growth stage,
/// cycling through [`STAGE_SCORES`] in topic order.
pub fn level_up_topics(garden: &mut Garden, square_id: &SquareId) -> Result<usize, GardenError> {
    let topic_ids: Vec<TopicId> = garden
        .topics_by_subject(square_id)
        .iter()
        .map(|t| t.id)
        .collect();

    for (index, id) in topic_ids.iter().enumerate() {
        garden.update_engagement(*id, STAGE_SCORES[index % STAGE_SCORES.len()])?;
    }
    Ok(topic_ids.len())
}

/// Delete every topic in a square, through the cascading delete so no study
/// history is left behind.
pub fn clear_subject_topics(garden: &mut Garden, square_id: &SquareId) -> Result<usize, GardenError> {
    let topic_ids: Vec<TopicId> = garden
        .topics_by_subject(square_id)
        .iter()
        .map(|t| t.id)
        .collect();

    for id in &topic_ids {
        garden.delete_topic(*id)?;
    }
    Ok(topic_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_world::{GrowthStage, SubjectTheme};

    const ALL_STAGES: [GrowthStage; 5] = [
        GrowthStage::Seedling,
        GrowthStage::Sapling,
        GrowthStage::Young,
        GrowthStage::Mature,
        GrowthStage::Ancient,
    ];

    fn garden_with_square() -> (Garden, SquareId) {
        let mut garden = Garden::default();
        let square = garden.add_subject_square("Demo", SubjectTheme::Crystalline);
        (garden, square)
    }

    #[test]
    fn test_seed_plants_every_stage() {
        let (mut garden, square) = garden_with_square();
        let planted = seed_demo_topics(&mut garden, &square).unwrap();
        assert_eq!(planted.len(), 10);

        let stages: Vec<GrowthStage> = planted
            .iter()
            .map(|id| garden.topic(*id).unwrap().growth_stage())
            .collect();
        for stage in ALL_STAGES {
            assert!(stages.contains(&stage), "missing stage {:?}", stage);
        }
    }

    #[test]
    fn test_seed_lays_out_grid() {
        let (mut garden, square) = garden_with_square();
        let planted = seed_demo_topics(&mut garden, &square).unwrap();

        let first = garden.topic(planted[0]).unwrap().position;
        assert_eq!(first, Position::new(300.0, 400.0));
        // The second row starts below the first.
        let sixth = garden.topic(planted[5]).unwrap().position;
        assert_eq!(sixth.x, first.x);
        assert!(sixth.y > first.y);
        // Everything stays in bounds.
        for id in &planted {
            let pos = garden.topic(*id).unwrap().position;
            assert!(pos.x >= 0.0 && pos.x <= garden.config().width);
            assert!(pos.y >= 0.0 && pos.y <= garden.config().height);
        }
    }

    #[test]
    fn test_level_up_cycles_stage_scores() {
        let (mut garden, square) = garden_with_square();
        let mut ids = Vec::new();
        for i in 0..7 {
            ids.push(
                garden
                    .add_topic(&format!("Topic {i}"), &square, Position::default())
                    .unwrap(),
            );
        }

        assert_eq!(level_up_topics(&mut garden, &square).unwrap(), 7);
        assert_eq!(garden.topic(ids[0]).unwrap().engagement_score, 5);
        assert_eq!(garden.topic(ids[4]).unwrap().engagement_score, 92);
        // The sixth topic wraps back to the first stage score.
        assert_eq!(garden.topic(ids[5]).unwrap().engagement_score, 5);
    }

    #[test]
    fn test_clear_removes_only_that_square() {
        let mut garden = Garden::default();
        let demo = garden.add_subject_square("Demo", SubjectTheme::Crystalline);
        let other = garden.add_subject_square("Other", SubjectTheme::Angular);
        seed_demo_topics(&mut garden, &demo).unwrap();
        let kept = garden.add_topic("Keeper", &other, Position::default()).unwrap();

        assert_eq!(clear_subject_topics(&mut garden, &demo).unwrap(), 10);
        assert!(garden.topics_by_subject(&demo).is_empty());
        assert!(garden.topic(kept).is_some());
    }
}
