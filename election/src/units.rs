//! Value/unit accounting for active votes.
//!
//! Each group keeps a pool of active value owned through units. Rewards are
//! added to the pool value without minting units, which raises the value of
//! every unit at once.
//!
//! Rounding always favours the pool:
//! - minting floors (`units = value * unit_total / total`, at least 1),
//! - an account's value floors (`units * total / unit_total`),
//! - burning ceils (`ceil(value * units / account_value)`, capped at `units`).
//!
//! Per-account values can therefore drift below their ideal proportional share
//! by a small amount that grows with the number of operations.

use crate::error::ElectionError;
use std::collections::HashMap;
use valelect_types::{mul_div_ceil, mul_div_floor, Address};

/// Active votes for one group.
#[derive(Clone, Debug, Default)]
pub struct ActivePool {
    total: u128,
    unit_total: u128,
    units_by_account: HashMap<Address, u128>,
}

impl ActivePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total active value, rewards included.
    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn unit_total(&self) -> u128 {
        self.unit_total
    }

    pub fn units_of(&self, account: &Address) -> u128 {
        self.units_by_account.get(account).copied().unwrap_or(0)
    }

    /// Accounts currently holding units.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.units_by_account.iter()
    }

    /// No units and no value left.
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.unit_total == 0
    }

    /// Convert units to value, flooring.
    pub fn units_to_value(&self, units: u128) -> Result<u128, ElectionError> {
        if self.unit_total == 0 {
            return Ok(0);
        }
        Ok(mul_div_floor(units, self.total, self.unit_total)?)
    }

    /// Convert value to units at the current rate, flooring, at least one unit
    /// for a non-zero value. An empty pool mints one unit per unit of value.
    pub fn value_to_units(&self, value: u128) -> Result<u128, ElectionError> {
        if value == 0 {
            return Ok(0);
        }
        if self.unit_total == 0 || self.total == 0 {
            return Ok(value);
        }
        Ok(mul_div_floor(value, self.unit_total, self.total)?.max(1))
    }

    /// The active value an account can currently withdraw.
    pub fn value_of(&self, account: &Address) -> Result<u128, ElectionError> {
        self.units_to_value(self.units_of(account))
    }

    /// Credit `value` of active votes to `account`. Returns the units minted.
    pub fn increment(&mut self, account: &Address, value: u128) -> Result<u128, ElectionError> {
        let units = self.value_to_units(value)?;
        let unit_total = self
            .unit_total
            .checked_add(units)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        let total = self
            .total
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        let balance = self.units_by_account.entry(*account).or_insert(0);
        *balance = balance
            .checked_add(units)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        self.unit_total = unit_total;
        self.total = total;
        Ok(units)
    }

    /// Debit `value` of active votes from `account`. Returns the units burned.
    pub fn decrement(&mut self, account: &Address, value: u128) -> Result<u128, ElectionError> {
        let units = self.units_of(account);
        let available = self.units_to_value(units)?;
        if value > available {
            return Err(ElectionError::InsufficientActiveVotes {
                requested: value,
                available,
            });
        }
        if value == 0 {
            return Ok(0);
        }
        let burned = mul_div_ceil(value, units, available)?.min(units);

        let remaining = units - burned;
        if remaining == 0 {
            self.units_by_account.remove(account);
        } else {
            self.units_by_account.insert(*account, remaining);
        }
        self.unit_total -= burned;
        self.total -= value;
        Ok(burned)
    }

    /// Add rewards to the pool without minting units.
    pub fn distribute(&mut self, reward: u128) -> Result<(), ElectionError> {
        self.total = self
            .total
            .checked_add(reward)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Sum of per-account units equals the unit total.
    pub(crate) fn units_consistent(&self) -> bool {
        let mut sum: u128 = 0;
        for units in self.units_by_account.values() {
            match sum.checked_add(*units) {
                Some(s) => sum = s,
                None => return false,
            }
        }
        sum == self.unit_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn first_deposit_mints_one_to_one() {
        let mut pool = ActivePool::new();
        assert_eq!(pool.increment(&a(1), 1000).unwrap(), 1000);
        assert_eq!(pool.total(), 1000);
        assert_eq!(pool.unit_total(), 1000);
        assert_eq!(pool.value_of(&a(1)).unwrap(), 1000);
    }

    #[test]
    fn rewards_raise_unit_value() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 1000).unwrap();
        pool.distribute(111).unwrap();
        assert_eq!(pool.value_of(&a(1)).unwrap(), 1111);
        assert_eq!(pool.unit_total(), 1000);
    }

    #[test]
    fn rewards_split_proportionally() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 300).unwrap();
        pool.increment(&a(2), 100).unwrap();
        pool.distribute(400).unwrap();
        assert_eq!(pool.value_of(&a(1)).unwrap(), 600);
        assert_eq!(pool.value_of(&a(2)).unwrap(), 200);
    }

    #[test]
    fn later_deposit_mints_at_current_rate() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 1000).unwrap();
        pool.distribute(1000).unwrap();
        // Each unit is now worth 2.
        assert_eq!(pool.increment(&a(2), 500).unwrap(), 250);
        assert_eq!(pool.value_of(&a(2)).unwrap(), 500);
        assert_eq!(pool.value_of(&a(1)).unwrap(), 2000);
    }

    #[test]
    fn tiny_deposit_mints_at_least_one_unit() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 10).unwrap();
        pool.distribute(990).unwrap();
        // floor(1 * 10 / 1000) == 0, bumped to one unit.
        assert_eq!(pool.increment(&a(2), 1).unwrap(), 1);
    }

    #[test]
    fn full_withdrawal_burns_all_units() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 700).unwrap();
        pool.increment(&a(2), 300).unwrap();
        pool.distribute(100).unwrap();
        let value = pool.value_of(&a(1)).unwrap();
        assert_eq!(value, 770);
        assert_eq!(pool.decrement(&a(1), value).unwrap(), 700);
        assert_eq!(pool.units_of(&a(1)), 0);
        assert_eq!(pool.value_of(&a(2)).unwrap(), 330);
        assert!(pool.units_consistent());
    }

    #[test]
    fn partial_withdrawal_rounds_units_up() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 3).unwrap();
        pool.distribute(1).unwrap();
        // 3 units worth 4; withdrawing 1 burns ceil(1 * 3 / 4) = 1 unit.
        assert_eq!(pool.decrement(&a(1), 1).unwrap(), 1);
        assert_eq!(pool.units_of(&a(1)), 2);
        assert_eq!(pool.value_of(&a(1)).unwrap(), 3);
    }

    #[test]
    fn cannot_withdraw_more_than_value() {
        let mut pool = ActivePool::new();
        pool.increment(&a(1), 100).unwrap();
        let err = pool.decrement(&a(1), 101).unwrap_err();
        assert!(matches!(
            err,
            ElectionError::InsufficientActiveVotes {
                requested: 101,
                available: 100
            }
        ));
        assert_eq!(pool.total(), 100);
    }

    #[test]
    fn unknown_account_has_nothing() {
        let pool = ActivePool::new();
        assert_eq!(pool.value_of(&a(9)).unwrap(), 0);
        assert!(pool.is_empty());
    }
}
