use crate::TroveError;

pub trait CheckedAssign {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), TroveError>;
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), TroveError>;
}

impl CheckedAssign for u64 {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), TroveError> {
        *self = self.checked_add(rhs).ok_or(TroveError::MathOverflow)?;
        Ok(())
    }
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), TroveError> {
        *self = self.checked_sub(rhs).ok_or(TroveError::MathOverflow)?;
        Ok(())
    }
}

impl CheckedAssign for u128 {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), TroveError> {
        *self = self.checked_add(rhs).ok_or(TroveError::MathOverflow)?;
        Ok(())
    }
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), TroveError> {
        *self = self.checked_sub(rhs).ok_or(TroveError::MathOverflow)?;
        Ok(())
    }
}

pub struct USDX;
pub struct COLL;
pub struct PRICE;
pub struct RATE;

impl USDX {
    #[cfg(test)]
    pub fn from(amount: f64) -> u128 {
        super::math::decimal_to_u128(amount)
    }
}

impl COLL {
    #[cfg(test)]
    pub fn from(amount: f64) -> u128 {
        super::math::decimal_to_u128(amount)
    }
}

impl PRICE {
    #[cfg(test)]
    pub fn from(price: f64) -> u128 {
        super::math::decimal_to_u128(price)
    }
}

impl RATE {
    #[cfg(test)]
    pub fn from_percent(pct: f64) -> u128 {
        super::math::decimal_to_u128(pct / 100.0)
    }
}
