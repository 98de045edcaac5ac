//! Healing affordability
//!
//! Funds usable for care are cash, or the credit line when it is larger.
//! An unconscious patient with any funds at all is always quoted at
//! least one hit point, so stabilization is never priced out entirely.

use crate::economy::FinancialAccount;

/// A priced amount of healing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealingQuote {
    pub hp: i32,
    pub cost: i64,
}

/// Most HP this account can pay for, capped at missing health.
pub fn max_affordable_healing(
    account: &FinancialAccount,
    current_health: i32,
    max_health: i32,
    cost_per_hp: i64,
) -> HealingQuote {
    let missing = (max_health - current_health).max(0) as i64;
    let available = account.available_funds();
    let affordable = if cost_per_hp > 0 {
        available / cost_per_hp
    } else {
        missing
    };
    let hp = affordable.min(missing).max(0);

    if hp == 0 && current_health <= 0 && missing > 0 && available > 0 {
        // Prioritize stabilization: one discounted HP rather than none.
        return HealingQuote {
            hp: 1,
            cost: available.min(cost_per_hp),
        };
    }

    HealingQuote {
        hp: hp as i32,
        cost: hp * cost_per_hp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(cash: i64, bank: i64, multiplier: f64) -> FinancialAccount {
        FinancialAccount {
            cash,
            bank,
            credit_multiplier: multiplier,
            tax_credits: 0,
        }
    }

    #[test]
    fn capped_by_funds_then_by_missing_health() {
        // 5000 cash at 1000/hp affords 5, but only 4 HP are missing.
        let quote = max_affordable_healing(&account(5000, 0, 0.0), -3, 1, 1000);
        assert_eq!(quote, HealingQuote { hp: 4, cost: 4000 });

        let quote = max_affordable_healing(&account(3000, 0, 0.0), -3, 1, 1000);
        assert_eq!(quote, HealingQuote { hp: 3, cost: 3000 });
    }

    #[test]
    fn never_quotes_past_max_health() {
        let quote = max_affordable_healing(&account(100_000, 0, 0.0), 7, 10, 1000);
        assert_eq!(quote.hp, 3);
        assert_eq!(quote.cost, 3000);
    }

    #[test]
    fn unconscious_patient_with_any_funds_gets_one_hp() {
        let quote = max_affordable_healing(&account(400, 0, 0.0), -2, 10, 1000);
        assert_eq!(quote, HealingQuote { hp: 1, cost: 400 });
    }

    #[test]
    fn broke_patient_gets_nothing() {
        let quote = max_affordable_healing(&account(0, 0, 0.0), -2, 10, 1000);
        assert_eq!(quote, HealingQuote { hp: 0, cost: 0 });
    }

    #[test]
    fn conscious_patient_gets_no_charity_hp() {
        let quote = max_affordable_healing(&account(400, 0, 0.0), 3, 10, 1000);
        assert_eq!(quote, HealingQuote { hp: 0, cost: 0 });
    }

    #[test]
    fn credit_line_extends_affordability() {
        // Cash 1000 but credit line (1000+2000)*2 = 6000 covers more.
        let quote = max_affordable_healing(&account(1000, 2000, 2.0), -3, 3, 1000);
        assert_eq!(quote, HealingQuote { hp: 6, cost: 6000 });
    }
}
