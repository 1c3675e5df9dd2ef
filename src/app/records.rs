use super::cards::{Card, CardKind};

pub(crate) const MAX_INPUT_VALUE: u32 = 999;
pub(crate) const NO_RECORD_PLACEHOLDER: &str = "（記録なし）";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordRow {
    pub(crate) weight: u32,
    pub(crate) reps: u32,
    pub(crate) bodyweight: bool,
}

impl RecordRow {
    pub(crate) fn new(default_reps: u32) -> Self {
        Self {
            weight: 0,
            reps: default_reps,
            bodyweight: false,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(0)
    }

    /// Takes over the previous set's reps, and either its bodyweight mode or
    /// its weight. The stored weight of a bodyweight row is left untouched.
    pub(crate) fn copy_previous(&mut self, previous: &RecordRow) {
        self.reps = previous.reps;
        if previous.bodyweight {
            self.bodyweight = true;
        } else {
            self.bodyweight = false;
            self.weight = previous.weight;
        }
    }

    pub(crate) fn toggle_bodyweight(&mut self) {
        self.bodyweight = !self.bodyweight;
    }

    pub(crate) fn is_valid(&self) -> bool {
        if self.bodyweight {
            self.reps > 0
        } else {
            self.weight > 0 && self.reps > 0
        }
    }

    pub(crate) fn summary_line(&self) -> String {
        if self.bodyweight {
            format!("自重 × {}回", self.reps)
        } else {
            format!("{}kg × {}回", self.weight, self.reps)
        }
    }
}

pub(crate) fn push_digit(value: u32, digit: u32) -> u32 {
    let next = value.saturating_mul(10).saturating_add(digit);
    if next > MAX_INPUT_VALUE { value } else { next }
}

pub(crate) fn pop_digit(value: u32) -> u32 {
    value / 10
}

/// Renders the session summary from the training cards in order. Reading
/// only: calling this repeatedly with unchanged rows yields identical text.
pub(crate) fn generate_summary(cards: &[Card]) -> String {
    let mut out = String::new();
    for card in cards {
        if card.kind != CardKind::Training {
            continue;
        }
        out.push_str(&card.title);
        out.push('\n');
        let mut has_valid = false;
        for row in &card.records {
            if row.is_valid() {
                out.push_str("  ");
                out.push_str(&row.summary_line());
                out.push('\n');
                has_valid = true;
            }
        }
        if !has_valid {
            out.push_str(NO_RECORD_PLACEHOLDER);
            out.push('\n');
        }
        out.push('\n');
    }
    out.trim().to_string()
}
