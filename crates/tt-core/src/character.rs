//! Characters: one participant in a game, player-controlled or NPC.
//!
//! Vitals and cash are clamped on every write so that
//! `0 <= current_hp <= max_hp` and `cash >= 0` always hold. A character whose
//! hit points reach zero stops living; the liveness flag may also be cleared
//! on its own (a narrative death outside combat).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol shown for a character nobody picked one for.
pub const DEFAULT_SYMBOL: &str = "🤖";

/// Hit points of a freshly created character.
pub const DEFAULT_MAX_HP: u32 = 6;

/// A single game participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CharacterRecord")]
pub struct Character {
    name: String,
    symbol: String,
    max_hp: u32,
    current_hp: u32,
    cash: i64,
    player_control: bool,
    is_living: bool,
    inventory: Vec<String>,
    skills: Vec<String>,
    archetype: String,
    background: String,
    physical_description: String,
    condition: String,
    goals: String,
    contextualized: bool,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: DEFAULT_SYMBOL.to_string(),
            max_hp: DEFAULT_MAX_HP,
            current_hp: DEFAULT_MAX_HP,
            cash: 0,
            player_control: false,
            is_living: true,
            inventory: Vec::new(),
            skills: Vec::new(),
            archetype: String::new(),
            background: String::new(),
            physical_description: String::new(),
            condition: String::new(),
            goals: String::new(),
            contextualized: false,
        }
    }
}

impl Character {
    /// Create a living NPC with default vitals and full hit points.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Getters
    // -----------------------------------------------------------------------

    /// Unique name within a session.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Maximum hit points (always at least 1).
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Current hit points.
    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Cash balance (never negative).
    pub fn cash(&self) -> i64 {
        self.cash
    }

    /// Whether a player controls this character.
    pub fn player_control(&self) -> bool {
        self.player_control
    }

    /// Whether the character is alive.
    pub fn is_living(&self) -> bool {
        self.is_living
    }

    /// Carried items in acquisition order.
    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// Known skills in learning order.
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Free-text archetype label.
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Free-text background.
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Free-text physical description.
    pub fn physical_description(&self) -> &str {
        &self.physical_description
    }

    /// Transient status such as "poisoned"; empty when normal.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Free-text goals.
    pub fn goals(&self) -> &str {
        &self.goals
    }

    /// Whether the character has been placed into a running story.
    pub fn contextualized(&self) -> bool {
        self.contextualized
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Rename the character.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Change the display symbol.
    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = symbol.into();
    }

    /// Set maximum hit points (at least 1), lowering current hit points to fit.
    pub fn set_max_hp(&mut self, max_hp: u32) {
        self.max_hp = max_hp.max(1);
        self.current_hp = self.current_hp.min(self.max_hp);
    }

    /// Set current hit points, clamped to `0..=max_hp`. Zero ends the character.
    pub fn set_current_hp(&mut self, current_hp: u32) {
        self.current_hp = current_hp.min(self.max_hp);
        if self.current_hp == 0 {
            self.is_living = false;
        }
    }

    /// Set the cash balance; negative amounts become zero.
    pub fn set_cash(&mut self, cash: i64) {
        self.cash = cash.max(0);
    }

    /// Add a signed amount to the balance, clamping at zero. Returns the new balance.
    pub fn adjust_cash(&mut self, delta: i64) -> i64 {
        self.set_cash(self.cash.saturating_add(delta));
        self.cash
    }

    /// Hand control to a player (`true`) or the computer (`false`).
    pub fn set_player_control(&mut self, player_control: bool) {
        self.player_control = player_control;
    }

    /// Force the liveness flag. A character at 0 HP stays dead.
    pub fn set_is_living(&mut self, is_living: bool) {
        self.is_living = is_living && self.current_hp > 0;
    }

    /// Replace the inventory.
    pub fn set_inventory(&mut self, inventory: Vec<String>) {
        self.inventory = inventory;
    }

    /// Replace the skill list, dropping duplicates.
    pub fn set_skills(&mut self, skills: Vec<String>) {
        self.skills.clear();
        for skill in skills {
            self.learn_skill(skill);
        }
    }

    /// Set the archetype label.
    pub fn set_archetype(&mut self, archetype: impl Into<String>) {
        self.archetype = archetype.into();
    }

    /// Set the background text.
    pub fn set_background(&mut self, background: impl Into<String>) {
        self.background = background.into();
    }

    /// Set the physical description.
    pub fn set_physical_description(&mut self, description: impl Into<String>) {
        self.physical_description = description.into();
    }

    /// Set the transient condition.
    pub fn set_condition(&mut self, condition: impl Into<String>) {
        self.condition = condition.into();
    }

    /// Clear the transient condition.
    pub fn clear_condition(&mut self) {
        self.condition.clear();
    }

    /// Set the goals text.
    pub fn set_goals(&mut self, goals: impl Into<String>) {
        self.goals = goals.into();
    }

    /// Mark whether the character has been placed into the story.
    pub fn set_contextualized(&mut self, contextualized: bool) {
        self.contextualized = contextualized;
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Apply damage. Returns true if this call killed the character.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_living = self.is_living;
        self.current_hp = self.current_hp.saturating_sub(amount);
        if self.current_hp == 0 {
            self.is_living = false;
        }
        was_living && !self.is_living
    }

    /// Restore hit points up to the maximum. Returns the amount actually healed.
    ///
    /// The dead cannot be healed: the call returns 0 and changes nothing.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_living {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Append an item to the inventory.
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.inventory.push(item.into());
    }

    /// Remove the first matching item. Returns true if it was carried.
    pub fn remove_item(&mut self, item: &str) -> bool {
        match self.inventory.iter().position(|i| i == item) {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Learn a skill unless it is already known.
    pub fn learn_skill(&mut self, skill: impl Into<String>) {
        let skill = skill.into();
        if !self.skills.contains(&skill) {
            self.skills.push(skill);
        }
    }

    /// One roster entry: symbol, name, archetype, vitals, cash, condition, control.
    pub fn summary_line(&self) -> String {
        format!(
            "{} {} ({})\n  HP: {}/{}\n  Cash: ¥{}\n  Condition: {}\n  Control: {}",
            self.symbol,
            self.name,
            self.archetype,
            self.current_hp,
            self.max_hp,
            self.cash,
            or_default(&self.condition, "Normal"),
            if self.player_control { "Player" } else { "NPC" },
        )
    }
}

impl fmt::Display for Character {
    /// Renders the full character sheet.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.current_hp as usize;
        let empty = self.max_hp.saturating_sub(self.current_hp) as usize;
        let hp_bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
        let rule = "═".repeat(43);

        writeln!(f, "{} CHARACTER SHEET {}", self.symbol, self.symbol)?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "NAME: {}", or_default(&self.name, "Unknown"))?;
        writeln!(f, "ARCHETYPE: {}", or_default(&self.archetype, "Unspecified"))?;
        writeln!(f)?;
        writeln!(f, "VITAL STATS")?;
        writeln!(f, "• HP: [{hp_bar}] {}/{}", self.current_hp, self.max_hp)?;
        writeln!(f, "• Cash: ¥{}", group_thousands(self.cash))?;
        writeln!(f, "• Condition: {}", or_default(&self.condition, "Normal"))?;
        if !self.is_living {
            writeln!(f, "• DECEASED")?;
        }
        writeln!(f)?;
        writeln!(f, "BACKGROUND")?;
        writeln!(
            f,
            "{}",
            or_default(&self.background, "No background information available.")
        )?;
        writeln!(f)?;
        writeln!(f, "PHYSICAL DESCRIPTION")?;
        writeln!(
            f,
            "{}",
            or_default(
                &self.physical_description,
                "No physical description available."
            )
        )?;
        writeln!(f)?;
        writeln!(f, "GOALS")?;
        writeln!(f, "{}", or_default(&self.goals, "No specific goals defined."))?;
        writeln!(f)?;
        writeln!(f, "INVENTORY [{} items]", self.inventory.len())?;
        write_bullets(f, &self.inventory, "Empty")?;
        writeln!(f)?;
        writeln!(f, "SKILLS [{} skills]", self.skills.len())?;
        write_bullets(f, &self.skills, "None learned")
    }
}

fn write_bullets(f: &mut fmt::Formatter<'_>, items: &[String], empty: &str) -> fmt::Result {
    if items.is_empty() {
        return writeln!(f, "• {empty}");
    }
    for item in items {
        writeln!(f, "• {item}")?;
    }
    Ok(())
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// On-disk shape of a character. Missing fields take the defaults of a new
/// character; conversion re-applies the vitals and skill invariants.
#[derive(Deserialize)]
#[serde(default)]
struct CharacterRecord {
    name: String,
    symbol: String,
    max_hp: u32,
    current_hp: Option<u32>,
    cash: i64,
    player_control: bool,
    is_living: bool,
    inventory: Vec<String>,
    skills: Vec<String>,
    archetype: String,
    background: String,
    physical_description: String,
    condition: String,
    goals: String,
    contextualized: bool,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        let c = Character::default();
        Self {
            name: c.name,
            symbol: c.symbol,
            max_hp: c.max_hp,
            current_hp: None,
            cash: c.cash,
            player_control: c.player_control,
            is_living: c.is_living,
            inventory: c.inventory,
            skills: c.skills,
            archetype: c.archetype,
            background: c.background,
            physical_description: c.physical_description,
            condition: c.condition,
            goals: c.goals,
            contextualized: c.contextualized,
        }
    }
}

impl From<CharacterRecord> for Character {
    fn from(record: CharacterRecord) -> Self {
        let mut character = Character {
            name: record.name,
            symbol: record.symbol,
            inventory: record.inventory,
            archetype: record.archetype,
            background: record.background,
            physical_description: record.physical_description,
            condition: record.condition,
            goals: record.goals,
            player_control: record.player_control,
            is_living: record.is_living,
            contextualized: record.contextualized,
            ..Character::default()
        };
        character.set_max_hp(record.max_hp);
        character.current_hp = record
            .current_hp
            .unwrap_or(character.max_hp)
            .min(character.max_hp);
        if character.current_hp == 0 {
            character.is_living = false;
        }
        character.set_cash(record.cash);
        character.set_skills(record.skills);
        character
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_character_defaults() {
        let c = Character::new("Alex");
        assert_eq!(c.name(), "Alex");
        assert_eq!(c.symbol(), DEFAULT_SYMBOL);
        assert_eq!(c.max_hp(), 6);
        assert_eq!(c.current_hp(), 6);
        assert_eq!(c.cash(), 0);
        assert!(c.is_living());
        assert!(!c.player_control());
        assert!(!c.contextualized());
    }

    #[test]
    fn damage_then_overkill_then_heal() {
        let mut c = Character::new("Chrome Sally");
        assert!(!c.take_damage(3));
        assert_eq!(c.current_hp(), 3);
        assert!(c.is_living());

        assert!(c.take_damage(10));
        assert_eq!(c.current_hp(), 0);
        assert!(!c.is_living());

        assert_eq!(c.heal(5), 0);
        assert_eq!(c.current_hp(), 0);
    }

    #[test]
    fn damage_on_the_dead_does_not_kill_again() {
        let mut c = Character::new("Ghost");
        assert!(c.take_damage(6));
        assert!(!c.take_damage(1));
    }

    #[test]
    fn forced_death_keeps_hit_points() {
        let mut c = Character::new("Mark");
        c.set_is_living(false);
        assert_eq!(c.current_hp(), 6);
        assert_eq!(c.heal(1), 0);
    }

    #[test]
    fn cannot_revive_at_zero_hit_points() {
        let mut c = Character::new("Mark");
        c.take_damage(10);
        c.set_is_living(true);
        assert_eq!(c.current_hp(), 0);
        assert!(!c.is_living());

        c.set_current_hp(3);
        c.set_is_living(true);
        assert!(c.is_living());
    }

    #[test]
    fn heal_is_capped_at_max() {
        let mut c = Character::new("Alex");
        c.take_damage(2);
        assert_eq!(c.heal(10), 2);
        assert_eq!(c.current_hp(), 6);
    }

    #[test]
    fn max_hp_lowers_current() {
        let mut c = Character::new("Alex");
        c.set_max_hp(4);
        assert_eq!(c.current_hp(), 4);
        c.set_max_hp(0);
        assert_eq!(c.max_hp(), 1);
        assert_eq!(c.current_hp(), 1);
    }

    #[test]
    fn set_current_hp_clamps_and_kills() {
        let mut c = Character::new("Alex");
        c.set_current_hp(99);
        assert_eq!(c.current_hp(), 6);
        c.set_current_hp(0);
        assert!(!c.is_living());
    }

    #[test]
    fn adjust_cash_clamps() {
        let mut c = Character::new("Alex");
        assert_eq!(c.adjust_cash(500), 500);
        assert_eq!(c.adjust_cash(-800), 0);
    }

    #[test]
    fn inventory_allows_duplicates() {
        let mut c = Character::new("Alex");
        c.add_item("Stim Pack");
        c.add_item("Stim Pack");
        assert!(c.remove_item("Stim Pack"));
        assert_eq!(c.inventory(), ["Stim Pack"]);
        assert!(c.remove_item("Stim Pack"));
        assert!(!c.remove_item("Stim Pack"));
    }

    #[test]
    fn set_skills_deduplicates() {
        let mut c = Character::new("Alex");
        c.set_skills(vec!["Hacking".into(), "Stealth".into(), "Hacking".into()]);
        assert_eq!(c.skills(), ["Hacking", "Stealth"]);
    }

    #[test]
    fn condition_set_and_clear() {
        let mut c = Character::new("Alex");
        c.set_condition("poisoned");
        assert_eq!(c.condition(), "poisoned");
        c.clear_condition();
        assert!(c.condition().is_empty());
    }

    #[test]
    fn sheet_renders_sections() {
        let mut c = Character::new("Zero Cool");
        c.set_cash(5000);
        c.add_item("Cyberdeck Model X");
        c.learn_skill("Hacking");
        c.take_damage(2);
        let sheet = c.to_string();
        assert!(sheet.contains("NAME: Zero Cool"));
        assert!(sheet.contains("[████░░] 4/6"));
        assert!(sheet.contains("Cash: ¥5,000"));
        assert!(sheet.contains("• Cyberdeck Model X"));
        assert!(sheet.contains("SKILLS [1 skills]"));
        assert!(sheet.contains("Condition: Normal"));
    }

    #[test]
    fn summary_line_marks_control() {
        let mut c = Character::new("Alex");
        c.set_player_control(true);
        assert!(c.summary_line().contains("Control: Player"));
    }

    #[test]
    fn group_thousands_formats() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn serde_keeps_current_hp() {
        let mut c = Character::new("Alex");
        c.take_damage(4);
        c.set_cash(12);
        c.learn_skill("Swordsmanship");
        c.set_contextualized(true);
        let json = serde_json::to_string(&c).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.current_hp(), 2);
    }

    #[test]
    fn missing_current_hp_defaults_to_max() {
        let back: Character = serde_json::from_str(r#"{"name":"A","max_hp":9}"#).unwrap();
        assert_eq!(back.current_hp(), 9);
        assert!(back.is_living());
    }

    #[test]
    fn deserialize_reapplies_invariants() {
        let back: Character = serde_json::from_str(
            r#"{"name":"A","max_hp":5,"current_hp":0,"cash":-3,"is_living":true,"skills":["x","x"]}"#,
        )
        .unwrap();
        assert!(!back.is_living());
        assert_eq!(back.cash(), 0);
        assert_eq!(back.skills(), ["x"]);
    }

    proptest! {
        #[test]
        fn damage_clamps_at_zero(start in 0u32..50, damage in 0u32..100) {
            let mut c = Character::new("P");
            c.set_max_hp(50);
            c.set_current_hp(start);
            let before = c.current_hp();
            c.take_damage(damage);
            prop_assert_eq!(c.current_hp(), before.saturating_sub(damage));
            if c.current_hp() == 0 {
                prop_assert!(!c.is_living());
            } else if before > 0 {
                prop_assert!(c.is_living());
            }
        }

        #[test]
        fn heal_clamps_at_max(max in 1u32..50, damage in 0u32..50, amount in 0u32..100) {
            let mut c = Character::new("P");
            c.set_max_hp(max);
            c.set_current_hp(max);
            c.take_damage(damage.min(max - 1));
            let before = c.current_hp();
            let healed = c.heal(amount);
            prop_assert_eq!(c.current_hp(), (before + amount).min(max));
            prop_assert_eq!(healed, c.current_hp() - before);
        }

        #[test]
        fn heal_on_dead_is_noop(amount in 0u32..100) {
            let mut c = Character::new("P");
            c.take_damage(100);
            let snapshot = c.clone();
            prop_assert_eq!(c.heal(amount), 0);
            prop_assert_eq!(c, snapshot);
        }

        #[test]
        fn cash_never_negative(x in any::<i64>()) {
            let mut c = Character::new("P");
            c.set_cash(x);
            prop_assert_eq!(c.cash(), x.max(0));
        }

        #[test]
        fn learn_skill_is_idempotent(skill in "[a-zA-Z ]{1,16}") {
            let mut c = Character::new("P");
            c.learn_skill(skill.clone());
            c.learn_skill(skill.clone());
            prop_assert_eq!(c.skills().iter().filter(|s| **s == skill).count(), 1);
        }
    }
}
