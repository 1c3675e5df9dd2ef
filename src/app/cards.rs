use std::fmt;

use rand::Rng;

use super::catalog::{AmbientClip, Catalog, Exercise};
use super::records::RecordRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CardKind {
    Preparation,
    Training,
    Rest,
    End,
}

impl CardKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Preparation => "準備",
            Self::Training => "トレーニング",
            Self::Rest => "休憩",
            Self::End => "終了",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Card {
    pub(crate) kind: CardKind,
    pub(crate) title: String,
    pub(crate) comment: String,
    pub(crate) media: Option<String>,
    pub(crate) audio: Option<String>,
    pub(crate) standard_reps: u32,
    pub(crate) standard_sets: u32,
    pub(crate) records: Vec<RecordRow>,
}

impl Card {
    fn training(exercise: &Exercise) -> Self {
        // A card always offers at least one row to fill in, even when the
        // catalog declares zero standard sets.
        let rows = exercise.standard_sets.max(1) as usize;
        Self {
            kind: CardKind::Training,
            title: exercise.title.clone(),
            comment: exercise.tips.clone(),
            media: exercise.media.clone(),
            audio: exercise.audio.clone(),
            standard_reps: exercise.standard_reps,
            standard_sets: exercise.standard_sets,
            records: vec![RecordRow::new(exercise.standard_reps); rows],
        }
    }

    fn ambient(kind: CardKind, clip: &AmbientClip) -> Self {
        Self {
            kind,
            title: kind.label().to_string(),
            comment: clip.comment.clone(),
            media: None,
            audio: clip.audio.clone(),
            standard_reps: 0,
            standard_sets: 0,
            records: Vec::new(),
        }
    }
}

/// The session was entered without any usable exercise selection. The caller
/// is expected to send the user back to the selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NoSelection;

impl fmt::Display for NoSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no exercises selected for this session")
    }
}

impl std::error::Error for NoSelection {}

pub(crate) fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub(crate) struct SelectionOutcome {
    pub(crate) exercises: Vec<Exercise>,
    pub(crate) unknown_ids: Vec<String>,
}

/// Resolves ids against the catalog, preserving selection order. Unknown ids
/// are reported back rather than failing the whole session.
pub(crate) fn resolve_selection(catalog: &Catalog, ids: &[String]) -> SelectionOutcome {
    let mut exercises = Vec::new();
    let mut unknown_ids = Vec::new();
    for id in ids {
        match catalog.exercises.iter().find(|exercise| exercise.id == *id) {
            Some(exercise) => exercises.push(exercise.clone()),
            None => unknown_ids.push(id.clone()),
        }
    }
    SelectionOutcome {
        exercises,
        unknown_ids,
    }
}

/// Builds the ordered card sequence: an optional preparation card, each
/// exercise's training card with a rest card between consecutive exercises,
/// and an optional end card. Ambient clips are drawn from their pools via
/// `pick`, which receives the pool size and returns an index into it.
pub(crate) fn build_cards(
    exercises: &[Exercise],
    prep_pool: &[AmbientClip],
    rest_pool: &[AmbientClip],
    end_pool: &[AmbientClip],
    pick: &mut dyn FnMut(usize) -> usize,
) -> Result<Vec<Card>, NoSelection> {
    if exercises.is_empty() {
        return Err(NoSelection);
    }

    let mut cards = Vec::new();
    if let Some(clip) = pick_clip(prep_pool, pick) {
        cards.push(Card::ambient(CardKind::Preparation, clip));
    }
    for (index, exercise) in exercises.iter().enumerate() {
        cards.push(Card::training(exercise));
        if index + 1 < exercises.len()
            && let Some(clip) = pick_clip(rest_pool, pick)
        {
            cards.push(Card::ambient(CardKind::Rest, clip));
        }
    }
    if let Some(clip) = pick_clip(end_pool, pick) {
        cards.push(Card::ambient(CardKind::End, clip));
    }
    Ok(cards)
}

fn pick_clip<'a>(
    pool: &'a [AmbientClip],
    pick: &mut dyn FnMut(usize) -> usize,
) -> Option<&'a AmbientClip> {
    if pool.is_empty() {
        return None;
    }
    let index = pick(pool.len()).min(pool.len() - 1);
    pool.get(index)
}

pub(crate) fn uniform_pick(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}
