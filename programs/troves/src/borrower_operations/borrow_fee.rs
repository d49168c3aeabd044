use crate::{
    utils::{consts::DECIMAL_PRECISION, math::mul_div_ceil},
    TroveError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowSplit {
    // The whole amount is added to the trove debt,
    // amount_to_borrow - fees_to_pay reaches the receiver
    pub amount_to_borrow: u128,
    pub fees_to_pay: u128,
}

impl BorrowSplit {
    pub fn split_fees(amount_to_borrow: u128, borrow_ratio: u128) -> Result<BorrowSplit, TroveError> {
        // favour the protocol
        let fees_to_pay = mul_div_ceil(amount_to_borrow, borrow_ratio, DECIMAL_PRECISION)?;
        if fees_to_pay > amount_to_borrow {
            return Err(TroveError::MathOverflow);
        }

        Ok(BorrowSplit {
            amount_to_borrow,
            fees_to_pay,
        })
    }

    pub fn amount_to_receiver(&self) -> u128 {
        self.amount_to_borrow - self.fees_to_pay
    }
}
