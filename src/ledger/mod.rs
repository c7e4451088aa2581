mod parse;

pub use parse::load_ledger;

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::util::week_floor;

pub type ExpenseId = usize;

#[derive(Clone, Debug)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: f32,
    pub name: String,
    pub date: NaiveDate,
    pub category_count: u32,
}

#[derive(Clone, Debug)]
pub struct Category {
    pub name: String,
    pub members: HashSet<ExpenseId>,
    pub total: f32,
}

/// Arena-style ledger state: expenses indexed by a dense id, categories
/// holding member ids rather than references.
#[derive(Clone, Debug, Default)]
pub struct LedgerStore {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
}

impl LedgerStore {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            expenses,
            categories: Vec::new(),
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.get(id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Most recent week (Sunday floor) present in the ledger.
    pub fn latest_week(&self) -> Option<NaiveDate> {
        self.expenses
            .iter()
            .map(|expense| week_floor(expense.date))
            .max()
    }

    /// Flip membership of `expense` in `category`. Linking adds, a second
    /// call removes again. Returns whether the pair ended up linked, or
    /// `None` if either side does not exist.
    pub fn toggle_link(&mut self, expense: ExpenseId, category: &str) -> Option<bool> {
        let amount = self.expenses.get(expense)?.amount;
        let expense_count = self.expenses.len();
        let entry = self
            .categories
            .iter_mut()
            .find(|entry| entry.name == category)?;

        // Drop ids that no longer resolve before touching membership.
        entry.members.retain(|&member| member < expense_count);

        let linked = if entry.members.remove(&expense) {
            entry.total -= amount;
            if let Some(record) = self.expenses.get_mut(expense) {
                record.category_count = record.category_count.saturating_sub(1);
            }
            false
        } else {
            entry.members.insert(expense);
            entry.total += amount;
            if let Some(record) = self.expenses.get_mut(expense) {
                record.category_count += 1;
            }
            true
        };
        Some(linked)
    }

    /// Overwrite the expense's date unconditionally.
    pub fn set_date(&mut self, expense: ExpenseId, date: NaiveDate) -> bool {
        match self.expenses.get_mut(expense) {
            Some(record) => {
                record.date = date;
                true
            }
            None => false,
        }
    }

    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.categories.iter().any(|entry| entry.name == name) {
            return false;
        }
        self.categories.push(Category {
            name: name.to_owned(),
            members: HashSet::new(),
            total: 0.0,
        });
        true
    }

    /// Presentation-level removal: member expenses keep their link count
    /// until they are re-linked elsewhere.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|entry| entry.name != name);
        self.categories.len() != before
    }
}
