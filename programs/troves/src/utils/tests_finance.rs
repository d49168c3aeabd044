#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::{
        utils::{
            consts::{DECIMAL_PRECISION, ONE_YEAR},
            coretypes::{COLL, PRICE, RATE, USDX},
            finance::{compute_cr, compute_nominal_cr, debt_to_coll, get_coll_penalty_and_surplus},
            math::{calc_interest, mul_div, mul_div_ceil, mul_div_saturating},
        },
        TroveError,
    };

    #[test]
    fn test_finance_mul_div_rounding() {
        assert_eq!(mul_div(10, 3, 4).unwrap(), 7);
        assert_eq!(mul_div_ceil(10, 3, 4).unwrap(), 8);
        assert_eq!(mul_div_ceil(12, 3, 4).unwrap(), 9);
        assert_eq!(mul_div(1, 1, 0), Err(TroveError::MathOverflow));
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(TroveError::MathOverflow));

        // the intermediate product does not overflow
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX).unwrap(), u128::MAX);
    }

    #[test]
    fn test_finance_mul_div_saturating() {
        assert_eq!(mul_div_saturating(u128::MAX, 2, 1), u128::MAX);
        assert_eq!(mul_div_saturating(5, 5, 0), u128::MAX);
        assert_eq!(mul_div_saturating(5, 6, 3), 10);
    }

    #[test]
    fn test_finance_simple_interest() {
        let debt = USDX::from(10_000.0);
        let rate = RATE::from_percent(5.0);

        assert_eq!(calc_interest(debt, rate, ONE_YEAR).unwrap(), USDX::from(500.0));
        assert_eq!(calc_interest(debt, rate, ONE_YEAR / 2).unwrap(), USDX::from(250.0));
        assert_eq!(calc_interest(debt, rate, 0).unwrap(), 0);
        assert_eq!(calc_interest(debt, 0, ONE_YEAR).unwrap(), 0);
    }

    #[test]
    fn test_finance_collateral_ratios() {
        let price = PRICE::from(2000.0);

        // 2 coll at 2000 against 2000 debt
        assert_eq!(
            compute_cr(COLL::from(2.0), USDX::from(2000.0), price),
            2 * DECIMAL_PRECISION
        );
        assert_eq!(compute_cr(COLL::from(2.0), 0, price), u128::MAX);

        // nominal ratio has 1e20 precision
        assert_eq!(
            compute_nominal_cr(COLL::from(2.0), USDX::from(2000.0)),
            DECIMAL_PRECISION / 10
        );
        assert_eq!(compute_nominal_cr(COLL::from(2.0), 0), u128::MAX);
    }

    #[test]
    fn test_finance_coll_penalty_and_surplus() {
        let price = PRICE::from(2000.0);
        let penalty = RATE::from_percent(5.0);

        // 200% ratio, the penalty caps what is seized
        let (seized, surplus) =
            get_coll_penalty_and_surplus(COLL::from(2.0), USDX::from(2000.0), penalty, price)
                .unwrap();
        assert_eq!(seized, COLL::from(1.05));
        assert_eq!(surplus, COLL::from(0.95));

        // 100% ratio, everything is seized
        let (seized, surplus) =
            get_coll_penalty_and_surplus(COLL::from(1.0), USDX::from(2000.0), penalty, price)
                .unwrap();
        assert_eq!(seized, COLL::from(1.0));
        assert_eq!(surplus, 0);

        assert_eq!(
            debt_to_coll(USDX::from(2000.0), RATE::from_percent(1.0), price).unwrap(),
            COLL::from(0.01)
        );
    }

    #[quickcheck]
    fn test_finance_mul_div_ceil_is_floor_or_floor_plus_one(a: u64, b: u64, c: u64) -> bool {
        let (a, b, c) = (a as u128, b as u128, c as u128 + 1);
        let floor = mul_div(a, b, c).unwrap();
        let ceil = mul_div_ceil(a, b, c).unwrap();
        let exact = (a * b) % c == 0;
        if exact {
            ceil == floor
        } else {
            ceil == floor + 1
        }
    }

    #[quickcheck]
    fn test_finance_penalty_split_conserves_collateral(coll: u64, debt: u64, price: u32) -> bool {
        let price = price as u128 + 1;
        let (seized, surplus) = get_coll_penalty_and_surplus(
            coll as u128,
            debt as u128,
            RATE::from_percent(10.0),
            price,
        )
        .unwrap();
        seized + surplus == coll as u128
    }
}
