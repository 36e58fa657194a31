//! Usage-credit accounting with optimistic charges.
//!
//! A charge is applied before the expensive collaborator call and carries
//! its pre-mutation snapshot; dropping an uncommitted charge restores the
//! exact prior balance rather than re-deriving an undo.

use crate::foundation::error::SlidecastError;

/// A numeric credit balance callers check before spending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditBalance {
    available: u32,
}

impl CreditBalance {
    /// Start with `available` credits.
    pub fn new(available: u32) -> Self {
        Self { available }
    }

    /// Credits currently available.
    pub fn available(&self) -> u32 {
        self.available
    }
}

/// The recoverable out-of-credits condition.
///
/// Distinct from the error enum so callers can branch into an
/// upgrade/limit path instead of a generic failure surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsufficientCredits {
    pub required: u32,
    pub available: u32,
}

impl From<InsufficientCredits> for SlidecastError {
    fn from(v: InsufficientCredits) -> Self {
        SlidecastError::InsufficientCredits {
            required: v.required,
            available: v.available,
        }
    }
}

/// An optimistic, in-flight credit deduction.
///
/// The balance is decremented on [`CreditCharge::begin`]; call
/// [`CreditCharge::commit`] once the spend succeeded. Dropping the charge
/// uncommitted rolls the balance back to its snapshot.
pub struct CreditCharge<'a> {
    balance: &'a mut CreditBalance,
    prior: u32,
    committed: bool,
}

impl<'a> CreditCharge<'a> {
    /// Deduct `amount` optimistically, or report the shortfall.
    pub fn begin(
        balance: &'a mut CreditBalance,
        amount: u32,
    ) -> Result<Self, InsufficientCredits> {
        if balance.available < amount {
            return Err(InsufficientCredits {
                required: amount,
                available: balance.available,
            });
        }
        let prior = balance.available;
        balance.available -= amount;
        Ok(Self {
            balance,
            prior,
            committed: false,
        })
    }

    /// Keep the deduction.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for CreditCharge<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.balance.available = self.prior;
        }
    }
}
