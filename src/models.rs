//! Domain models that mirror the `beck_table` schema. The questionnaire has a
//! fixed set of twelve items, so they are spelled out as named fields instead
//! of being looked up by string at runtime.

use std::fmt;

/// Number of scored questionnaire items stored per entry.
pub const ITEM_COUNT: usize = 12;

/// One questionnaire item. Variants are declared in column order, which is
/// also the order `ItemScores::values` and the INSERT statement use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Sadness,
    Outlook,
    Guilt,
    Solitude,
    SexDrive,
    Hygiene,
    Decisiveness,
    Effort,
    Interest,
    Pessimism,
    Victimhood,
    Sleep,
}

impl Item {
    pub const ALL: [Item; ITEM_COUNT] = [
        Item::Sadness,
        Item::Outlook,
        Item::Guilt,
        Item::Solitude,
        Item::SexDrive,
        Item::Hygiene,
        Item::Decisiveness,
        Item::Effort,
        Item::Interest,
        Item::Pessimism,
        Item::Victimhood,
        Item::Sleep,
    ];

    /// Column name in `beck_table`.
    pub fn column(self) -> &'static str {
        match self {
            Item::Sadness => "sadness",
            Item::Outlook => "outlook",
            Item::Guilt => "guilt",
            Item::Solitude => "solitude",
            Item::SexDrive => "sexdrive",
            Item::Hygiene => "hygiene",
            Item::Decisiveness => "decisiveness",
            Item::Effort => "effort",
            Item::Interest => "interest",
            Item::Pessimism => "pessimism",
            Item::Victimhood => "victimhood",
            Item::Sleep => "sleep",
        }
    }

    /// Label shown next to the slider.
    pub fn label(self) -> &'static str {
        match self {
            Item::Sadness => "Sadness",
            Item::Outlook => "Outlook",
            Item::Guilt => "Guilt",
            Item::Solitude => "Solitude",
            Item::SexDrive => "Sex drive",
            Item::Hygiene => "Hygiene",
            Item::Decisiveness => "Decisiveness",
            Item::Effort => "Effort",
            Item::Interest => "Interest",
            Item::Pessimism => "Pessimism",
            Item::Victimhood => "Victimhood",
            Item::Sleep => "Sleep",
        }
    }

    /// Short header used by the table view.
    pub fn abbrev(self) -> &'static str {
        match self {
            Item::Sadness => "Sad",
            Item::Outlook => "Out",
            Item::Guilt => "Glt",
            Item::Solitude => "Sol",
            Item::SexDrive => "Sex",
            Item::Hygiene => "Hyg",
            Item::Decisiveness => "Dec",
            Item::Effort => "Eff",
            Item::Interest => "Int",
            Item::Pessimism => "Pes",
            Item::Victimhood => "Vic",
            Item::Sleep => "Slp",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The twelve item scores of one questionnaire. Range clamping happens in the
/// form layer; this type stores whatever it is given so rows read back from
/// the database are represented verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemScores {
    pub sadness: i64,
    pub outlook: i64,
    pub guilt: i64,
    pub solitude: i64,
    pub sex_drive: i64,
    pub hygiene: i64,
    pub decisiveness: i64,
    pub effort: i64,
    pub interest: i64,
    pub pessimism: i64,
    pub victimhood: i64,
    pub sleep: i64,
}

impl ItemScores {
    /// Build from values listed in column order.
    pub fn from_values(values: [i64; ITEM_COUNT]) -> Self {
        let mut scores = Self::default();
        for (item, value) in Item::ALL.into_iter().zip(values) {
            scores.set(item, value);
        }
        scores
    }

    pub fn get(&self, item: Item) -> i64 {
        match item {
            Item::Sadness => self.sadness,
            Item::Outlook => self.outlook,
            Item::Guilt => self.guilt,
            Item::Solitude => self.solitude,
            Item::SexDrive => self.sex_drive,
            Item::Hygiene => self.hygiene,
            Item::Decisiveness => self.decisiveness,
            Item::Effort => self.effort,
            Item::Interest => self.interest,
            Item::Pessimism => self.pessimism,
            Item::Victimhood => self.victimhood,
            Item::Sleep => self.sleep,
        }
    }

    pub fn set(&mut self, item: Item, value: i64) {
        let slot = match item {
            Item::Sadness => &mut self.sadness,
            Item::Outlook => &mut self.outlook,
            Item::Guilt => &mut self.guilt,
            Item::Solitude => &mut self.solitude,
            Item::SexDrive => &mut self.sex_drive,
            Item::Hygiene => &mut self.hygiene,
            Item::Decisiveness => &mut self.decisiveness,
            Item::Effort => &mut self.effort,
            Item::Interest => &mut self.interest,
            Item::Pessimism => &mut self.pessimism,
            Item::Victimhood => &mut self.victimhood,
            Item::Sleep => &mut self.sleep,
        };
        *slot = value;
    }

    /// All scores in column order.
    pub fn values(&self) -> [i64; ITEM_COUNT] {
        Item::ALL.map(|item| self.get(item))
    }

    pub fn summary(&self) -> i64 {
        summary_score(&self.values())
    }
}

/// Total over the item scores. Only values strictly greater than zero are
/// added, so an item left at zero never contributes.
pub fn summary_score(values: &[i64]) -> i64 {
    values.iter().copied().filter(|value| *value > 0).sum()
}

/// One persisted questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM:SS`.
    pub time: String,
    pub items: ItemScores,
    /// Summary as stored; the store does not check it against `items`.
    pub summary: i64,
}

impl Entry {
    /// `date time` string used by status messages and the confirm dialog.
    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_skips_zero_items() {
        let scores = ItemScores::from_values([0, 1, 2, 0, 3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(scores.summary(), 6);
    }

    #[test]
    fn summary_ignores_negative_values() {
        assert_eq!(summary_score(&[-2, 3, 0, 1]), 4);
        assert_eq!(summary_score(&[]), 0);
    }

    #[test]
    fn values_follow_column_order() {
        let mut scores = ItemScores::default();
        scores.set(Item::Pessimism, 2);
        scores.set(Item::Victimhood, 3);

        let values = scores.values();
        let pessimism = Item::ALL.iter().position(|i| *i == Item::Pessimism).unwrap();
        let victimhood = Item::ALL.iter().position(|i| *i == Item::Victimhood).unwrap();
        assert_eq!(values[pessimism], 2);
        assert_eq!(values[victimhood], 3);
        assert!(pessimism < victimhood);
    }
}
