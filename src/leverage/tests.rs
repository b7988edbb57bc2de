//! Tests for the leveraged vault

#[cfg(test)]
mod tests {
    use odra::casper_types::U256;
    use odra::host::{Deployer, HostRef, NoArgs};
    use odra::prelude::*;
    use odra::ContractRef;
    use crate::errors::TokenError;
    use crate::lending::events::{Borrowed, Repaid, ReserveListed, Supplied, Withdrawn};
    use crate::lending::LendingPool;
    use crate::leverage::errors::LeverageError;
    use crate::leverage::math::RebalanceDirection;
    use crate::leverage::vault::{LeveragedVault, LeveragedVaultHostRef, LeveragedVaultInitArgs};
    use crate::test_env::{
        e18, setup, Fixture, Reentry, BASE_UNIT, LOWER_BOUND_BPS, MAX_SUBSIDY_BPS, MIN_DEPOSIT_BASE,
        TARGET_LEVERAGE_BPS, UPPER_BOUND_BPS,
    };
    use crate::token::{Cep18TokenContractRef, Token, TokenInitArgs};

    /// Pool that hands out one unit less than it books on every borrow
    #[odra::module(events = [Supplied, Withdrawn, Borrowed, Repaid, ReserveListed])]
    pub struct ShortingPool {
        inner: SubModule<LendingPool>,
    }

    #[odra::module]
    impl ShortingPool {
        pub fn init(&mut self, price_oracle: Address, max_ltv_bps: U256) {
            self.inner.init(price_oracle, max_ltv_bps);
        }

        pub fn list_reserve(&mut self, asset: Address) {
            self.inner.list_reserve(asset);
        }

        pub fn supply(&mut self, asset: Address, amount: U256, on_behalf_of: Address) {
            self.inner.supply(asset, amount, on_behalf_of);
        }

        pub fn withdraw(&mut self, asset: Address, amount: U256, to: Address) -> U256 {
            self.inner.withdraw(asset, amount, to)
        }

        pub fn borrow(&mut self, asset: Address, amount: U256, to: Address) {
            let this = self.env().self_address();
            self.inner.borrow(asset, amount, this);
            Cep18TokenContractRef::new(self.env(), asset).transfer(to, amount - U256::one());
        }

        pub fn repay(&mut self, asset: Address, amount: U256, on_behalf_of: Address) -> U256 {
            self.inner.repay(asset, amount, on_behalf_of)
        }

        pub fn collateral_balance(&self, asset: Address, account: Address) -> U256 {
            self.inner.collateral_balance(asset, account)
        }

        pub fn debt_balance(&self, asset: Address, account: Address) -> U256 {
            self.inner.debt_balance(asset, account)
        }
    }

    /// Vault embedded without ever running its `init`
    #[odra::module]
    pub struct BareVault {
        vault: SubModule<LeveragedVault>,
    }

    #[odra::module]
    impl BareVault {
        pub fn collateral_token(&self) -> Address {
            self.vault.collateral_token()
        }

        pub fn lending_pool(&self) -> Address {
            self.vault.lending_pool()
        }

        pub fn get_owner(&self) -> Address {
            self.vault.get_owner()
        }
    }

    fn bps(value: u64) -> U256 {
        U256::from(value)
    }

    fn deploy_vault_on(f: &Fixture, lending_pool: Address) -> LeveragedVaultHostRef {
        LeveragedVault::deploy(&f.env, LeveragedVaultInitArgs {
            name: String::from("Leveraged COL/DEBT"),
            symbol: String::from("lvCOL"),
            collateral_token: f.collateral.address().clone(),
            debt_token: f.debt.address().clone(),
            lending_pool,
            price_oracle: f.oracle.address().clone(),
            lower_bound_bps: bps(LOWER_BOUND_BPS),
            target_leverage_bps: bps(TARGET_LEVERAGE_BPS),
            upper_bound_bps: bps(UPPER_BOUND_BPS),
            max_subsidy_bps: bps(MAX_SUBSIDY_BPS),
            min_deposit_base: U256::from(MIN_DEPOSIT_BASE),
            extra_restricted_tokens: Vec::new(),
        })
    }

    /// Let `user` repay anything the vault asks for on redemption
    fn approve_debt(f: &mut Fixture, user: Address) {
        f.env.set_caller(user);
        f.debt.approve(f.vault.address().clone(), U256::MAX);
        f.env.set_caller(f.owner);
    }

    /// Push leverage to ~10.2x: collateral $0.85, debt $1.15
    fn push_above_upper_bound(f: &mut Fixture) {
        f.set_prices(85, 115);
        assert!(f.vault.get_current_leverage_bps() > bps(UPPER_BOUND_BPS));
    }

    #[test]
    fn test_vault_initialization() {
        let f = setup();
        assert_eq!(f.vault.name(), "Leveraged COL/DEBT");
        assert_eq!(f.vault.symbol(), "lvCOL");
        assert_eq!(f.vault.decimals(), 18);
        assert_eq!(f.vault.asset(), f.collateral.address().clone());
        assert_eq!(f.vault.debt_token(), f.debt.address().clone());
        assert_eq!(f.vault.get_target_leverage_bps(), bps(TARGET_LEVERAGE_BPS));
        assert_eq!(f.vault.get_owner(), f.owner);
        assert_eq!(
            f.vault.get_restricted_tokens(),
            vec![f.collateral.address().clone(), f.debt.address().clone()]
        );

        // empty vault
        assert_eq!(f.vault.total_assets(), U256::zero());
        assert_eq!(f.vault.get_current_leverage_bps(), U256::zero());
        assert!(!f.vault.is_too_imbalanced());
        assert_eq!(f.vault.get_current_subsidy_bps(), U256::zero());
        assert_eq!(f.vault.max_deposit(f.owner), U256::MAX);
        assert_eq!(f.vault.convert_to_shares(e18(7)), e18(7));
    }

    #[test]
    fn test_first_deposit_reaches_target_leverage() {
        let mut f = setup();
        let user = f.env.get_account(1);

        assert_eq!(f.vault.preview_deposit(e18(100)), e18(300));
        assert_eq!(f.vault.get_target_leveraged_assets(e18(100)), e18(300));
        let expected_borrow = f.vault.get_borrow_amount_for_deposit(e18(100));

        let shares = f.deposit(user, e18(100));

        assert_eq!(shares, e18(300));
        assert_eq!(f.vault.balance_of(user), e18(300));
        assert_eq!(f.vault.total_supply(), e18(300));
        assert_eq!(f.vault.total_assets(), e18(300));
        assert_eq!(f.pool.collateral_balance(f.collateral.address().clone(), f.vault.address().clone()), e18(100));

        // $66.66666666 of debt at 8 oracle decimals
        let borrowed = U256::from(6_666_666_666u64) * U256::exp10(10);
        assert_eq!(expected_borrow, borrowed);
        assert_eq!(f.debt.balance_of(user), borrowed);
        assert_eq!(f.pool.debt_balance(f.debt.address().clone(), f.vault.address().clone()), borrowed);

        Fixture::assert_close(f.vault.get_current_leverage_bps(), bps(TARGET_LEVERAGE_BPS), bps(100));
        assert!(!f.vault.is_too_imbalanced());
    }

    #[test]
    fn test_second_deposit_preserves_leverage() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));
        let before = f.vault.get_current_leverage_bps();

        let second = f.env.get_account(2);
        let shares = f.deposit(second, e18(50));

        assert_eq!(shares, e18(150));
        Fixture::assert_close(f.vault.get_current_leverage_bps(), before, bps(100));
        assert_eq!(f.vault.convert_to_assets(e18(150)), e18(150));
        assert_eq!(f.vault.preview_redeem(e18(150)), e18(50));
    }

    #[test]
    fn test_mint_pulls_previewed_collateral() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));

        let user = f.env.get_account(2);
        assert_eq!(f.vault.preview_mint(e18(30)), e18(10));
        f.collateral.mint(user, e18(10));

        f.env.set_caller(user);
        f.collateral.approve(f.vault.address().clone(), e18(10));
        let assets = f.vault.mint(e18(30), user);

        assert_eq!(assets, e18(10));
        assert_eq!(f.vault.balance_of(user), e18(30));
        assert_eq!(f.collateral.balance_of(user), U256::zero());
    }

    #[test]
    fn test_dust_deposit_cannot_borrow() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.collateral.mint(user, U256::one());

        f.env.set_caller(user);
        f.collateral.approve(f.vault.address().clone(), U256::one());
        assert_eq!(
            f.vault.try_deposit(U256::one(), user),
            Err(LeverageError::DebtBalanceNotIncreased.into())
        );
        assert_eq!(f.vault.try_deposit(U256::zero(), user), Err(LeverageError::ZeroAmount.into()));
        assert_eq!(f.vault.total_supply(), U256::zero());
    }

    #[test]
    fn test_deposit_below_floor_cannot_borrow() {
        let mut f = setup();
        let user = f.env.get_account(1);
        let vault = f.vault.address().clone();
        assert_eq!(f.vault.get_min_deposit_base(), U256::from(MIN_DEPOSIT_BASE));

        // worth 2 base units: the borrow would round the vault down to 2x
        let near_floor = U256::from(25_000_000_000u64);
        f.collateral.mint(user, near_floor);
        f.env.set_caller(user);
        f.collateral.approve(vault, near_floor);
        assert_eq!(
            f.vault.try_deposit(near_floor, user),
            Err(LeverageError::DebtBalanceNotIncreased.into())
        );

        // at skewed prices the debt would round to zero base value
        f.set_prices(85, 115);
        f.env.set_caller(user);
        assert_eq!(
            f.vault.try_deposit(U256::from(24_000_000_000u64), user),
            Err(LeverageError::DebtBalanceNotIncreased.into())
        );
        assert_eq!(f.vault.total_supply(), U256::zero());
        assert_eq!(f.collateral.balance_of(user), near_floor);

        // one dollar clears the floor and lands on target
        f.set_prices(100, 100);
        let shares = f.deposit(user, e18(1));
        assert_eq!(shares, e18(3));
        Fixture::assert_close(f.vault.get_current_leverage_bps(), bps(TARGET_LEVERAGE_BPS), bps(100));
        assert!(!f.vault.is_too_imbalanced());
    }

    #[test]
    fn test_deposit_floor_is_owner_configurable() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.vault.set_min_deposit_base(U256::from(10 * BASE_UNIT));
        assert_eq!(f.vault.get_min_deposit_base(), U256::from(10 * BASE_UNIT));

        f.collateral.mint(user, e18(5));
        f.env.set_caller(user);
        f.collateral.approve(f.vault.address().clone(), e18(5));
        assert_eq!(
            f.vault.try_deposit(e18(5), user),
            Err(LeverageError::DebtBalanceNotIncreased.into())
        );
        assert_eq!(
            f.vault.try_set_min_deposit_base(U256::zero()),
            Err(LeverageError::Unauthorized.into())
        );

        f.env.set_caller(f.owner);
        assert_eq!(f.deposit(user, e18(10)), e18(30));
    }

    #[test]
    fn test_reentrant_call_during_deposit_hits_lock() {
        let mut f = setup();
        let (mut token, mut vault) = f.reentrant_vault();
        let user = f.env.get_account(1);
        token.mint(user, e18(100));

        f.env.set_caller(user);
        token.approve(vault.address().clone(), e18(100));
        token.arm(vault.address().clone(), Reentry::Vault);
        // the collateral pull calls back into increase_leverage
        assert_eq!(vault.try_deposit(e18(100), user), Err(LeverageError::Locked.into()));
        assert_eq!(token.balance_of(user), e18(100));
        assert_eq!(vault.total_supply(), U256::zero());
        assert_eq!(f.debt.balance_of(user), U256::zero());
        assert_eq!(f.pool.collateral_balance(token.address().clone(), vault.address().clone()), U256::zero());

        // the reverted call leaves no lock behind
        token.disarm();
        assert_eq!(vault.deposit(e18(100), user), e18(300));
    }

    #[test]
    fn test_uninitialized_config_reads() {
        let env = odra_test::env();
        let bare = BareVault::deploy(&env, NoArgs);
        assert_eq!(bare.try_collateral_token(), Err(LeverageError::NotInitialized.into()));
        assert_eq!(bare.try_lending_pool(), Err(LeverageError::NotInitialized.into()));
        assert_eq!(bare.try_get_owner(), Err(LeverageError::NotInitialized.into()));
    }

    #[test]
    fn test_partial_redeem_preserves_leverage() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.deposit(user, e18(100));
        approve_debt(&mut f, user);

        let before = f.vault.get_current_leverage_bps();
        let debt_before = f.debt.balance_of(user);
        let repay = f.vault.get_repay_amount_for_redeem(e18(150));
        assert!(!repay.is_zero());

        f.env.set_caller(user);
        let assets = f.vault.redeem(e18(150), user, user);

        assert_eq!(assets, e18(50));
        assert_eq!(f.collateral.balance_of(user), e18(50));
        assert_eq!(f.vault.balance_of(user), e18(150));
        assert_eq!(f.debt.balance_of(user), debt_before - repay);
        Fixture::assert_close(f.vault.get_current_leverage_bps(), before, bps(100));
    }

    #[test]
    fn test_withdraw_burns_previewed_shares() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.deposit(user, e18(100));
        approve_debt(&mut f, user);

        assert_eq!(f.vault.preview_withdraw(e18(10)), e18(30));
        assert_eq!(f.vault.max_withdraw(user), e18(100));

        f.env.set_caller(user);
        let shares = f.vault.withdraw(e18(10), user, user);
        assert_eq!(shares, e18(30));
        assert_eq!(f.vault.balance_of(user), e18(270));
        assert_eq!(f.collateral.balance_of(user), e18(10));

        assert_eq!(
            f.vault.try_withdraw(e18(91), user, user),
            Err(LeverageError::ExceededMaxWithdraw.into())
        );
    }

    #[test]
    fn test_full_exit_closes_position() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.deposit(user, e18(100));
        approve_debt(&mut f, user);

        let outstanding = f.pool.debt_balance(f.debt.address().clone(), f.vault.address().clone());
        assert_eq!(f.vault.get_repay_amount_for_redeem(e18(300)), outstanding);

        f.env.set_caller(user);
        let assets = f.vault.redeem(e18(300), user, user);

        assert_eq!(assets, e18(100));
        assert_eq!(f.collateral.balance_of(user), e18(100));
        assert_eq!(f.debt.balance_of(user), U256::zero());
        assert_eq!(f.vault.total_supply(), U256::zero());
        assert_eq!(f.pool.collateral_balance(f.collateral.address().clone(), f.vault.address().clone()), U256::zero());
        assert_eq!(f.pool.debt_balance(f.debt.address().clone(), f.vault.address().clone()), U256::zero());
        assert_eq!(f.vault.get_current_leverage_bps(), U256::zero());
    }

    #[test]
    fn test_redeem_requires_debt_allowance() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.deposit(user, e18(100));

        f.env.set_caller(user);
        assert_eq!(
            f.vault.try_redeem(e18(100), user, user),
            Err(LeverageError::InsufficientAllowance.into())
        );
        assert_eq!(
            f.vault.try_redeem(e18(301), user, user),
            Err(LeverageError::ExceededMaxRedeem.into())
        );
    }

    #[test]
    fn test_third_party_redeem_spends_share_allowance() {
        let mut f = setup();
        let owner = f.env.get_account(1);
        let spender = f.env.get_account(2);
        f.deposit(owner, e18(100));
        approve_debt(&mut f, owner);

        f.env.set_caller(spender);
        assert_eq!(
            f.vault.try_redeem(e18(30), spender, owner),
            Err(TokenError::InsufficientAllowance.into())
        );

        f.env.set_caller(owner);
        f.vault.approve(spender, e18(30));

        f.env.set_caller(spender);
        let assets = f.vault.redeem(e18(30), spender, owner);
        assert_eq!(assets, e18(10));
        assert_eq!(f.collateral.balance_of(spender), e18(10));
        assert_eq!(f.vault.balance_of(owner), e18(270));
        assert_eq!(f.vault.allowance(owner, spender), U256::zero());
    }

    #[test]
    fn test_imbalance_gates_deposits_and_redeems() {
        let mut f = setup();
        let user = f.env.get_account(1);
        f.deposit(user, e18(100));
        approve_debt(&mut f, user);
        push_above_upper_bound(&mut f);

        assert!(f.vault.is_too_imbalanced());
        assert_eq!(f.vault.max_deposit(user), U256::zero());
        assert_eq!(f.vault.max_mint(user), U256::zero());
        assert_eq!(f.vault.max_withdraw(user), U256::zero());
        assert_eq!(f.vault.max_redeem(user), U256::zero());

        f.collateral.mint(user, e18(10));
        f.env.set_caller(user);
        f.collateral.approve(f.vault.address().clone(), e18(10));
        assert_eq!(f.vault.try_deposit(e18(10), user), Err(LeverageError::ExceededMaxDeposit.into()));
        assert_eq!(f.vault.try_mint(e18(10), user), Err(LeverageError::ExceededMaxMint.into()));
        assert_eq!(f.vault.try_redeem(e18(10), user, user), Err(LeverageError::ExceededMaxRedeem.into()));
    }

    #[test]
    fn test_decrease_leverage_restores_target() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));
        push_above_upper_bound(&mut f);

        let before = f.vault.get_current_leverage_bps();
        assert_eq!(f.vault.get_current_subsidy_bps(), bps(MAX_SUBSIDY_BPS));

        let quote = f.vault.get_amount_to_reach_target_leverage(false);
        assert_eq!(quote.direction, RebalanceDirection::Decrease);
        assert!(!quote.token_amount.is_zero());

        let keeper = f.env.get_account(3);
        f.debt.mint(keeper, quote.token_amount);
        f.env.set_caller(keeper);
        f.debt.approve(f.vault.address().clone(), quote.token_amount);
        let paid = f.vault.decrease_leverage(quote.token_amount, U256::zero());

        assert_eq!(f.collateral.balance_of(keeper), paid);
        assert_eq!(f.debt.balance_of(keeper), U256::zero());

        // repaid value plus the 5% subsidy
        let repaid_base = f.vault.convert_from_token_to_base_currency(quote.token_amount, f.debt.address().clone());
        let paid_base = f.vault.convert_from_token_to_base_currency(paid, f.collateral.address().clone());
        Fixture::assert_close(paid_base, repaid_base * U256::from(105u64) / U256::from(100u64), bps(2));

        let after = f.vault.get_current_leverage_bps();
        assert!(after < before);
        Fixture::assert_close(after, bps(TARGET_LEVERAGE_BPS), bps(100));
        assert!(!f.vault.is_too_imbalanced());
    }

    #[test]
    fn test_increase_leverage_restores_target() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));
        // collateral rallies, leverage falls to 2.25x
        f.set_prices(120, 100);
        let before = f.vault.get_current_leverage_bps();
        Fixture::assert_close(before, bps(2_250_000), bps(100));

        let quote = f.vault.get_amount_to_reach_target_leverage(false);
        assert_eq!(quote.direction, RebalanceDirection::Increase);

        let keeper = f.env.get_account(3);
        f.collateral.mint(keeper, quote.token_amount);
        f.env.set_caller(keeper);
        f.collateral.approve(f.vault.address().clone(), quote.token_amount);
        let paid = f.vault.increase_leverage(quote.token_amount, U256::zero());

        assert_eq!(f.debt.balance_of(keeper), paid);
        let supplied_base = f.vault.convert_from_token_to_base_currency(quote.token_amount, f.collateral.address().clone());
        let paid_base = f.vault.convert_from_token_to_base_currency(paid, f.debt.address().clone());
        assert!(paid_base > supplied_base);

        let after = f.vault.get_current_leverage_bps();
        assert!(after > before);
        Fixture::assert_close(after, bps(TARGET_LEVERAGE_BPS), bps(100));
    }

    #[test]
    fn test_rebalance_direction_checks() {
        let mut f = setup();
        assert_eq!(
            f.vault.try_increase_leverage(U256::zero(), U256::zero()),
            Err(LeverageError::NoPositionToRebalance.into())
        );

        f.deposit(f.env.get_account(1), e18(100));
        // just under target after the first deposit
        assert_eq!(
            f.vault.try_decrease_leverage(U256::zero(), U256::zero()),
            Err(LeverageError::LeverageAlreadyAtOrBelowTarget.into())
        );

        push_above_upper_bound(&mut f);
        assert_eq!(
            f.vault.try_increase_leverage(U256::zero(), U256::zero()),
            Err(LeverageError::LeverageAlreadyAtOrBeyondTarget.into())
        );
        // nothing to repay with
        assert_eq!(
            f.vault.try_decrease_leverage(U256::zero(), U256::zero()),
            Err(LeverageError::ZeroAmount.into())
        );
    }

    #[test]
    fn test_rebalance_slippage_and_overshoot() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));
        push_above_upper_bound(&mut f);

        let quote = f.vault.get_amount_to_reach_target_leverage(false);
        let keeper = f.env.get_account(3);
        f.debt.mint(keeper, quote.token_amount * U256::from(2u64));
        f.env.set_caller(keeper);
        f.debt.approve(f.vault.address().clone(), U256::MAX);

        assert_eq!(
            f.vault.try_decrease_leverage(quote.token_amount, U256::MAX),
            Err(LeverageError::SlippageNotMet.into())
        );
        // repaying 10% more than quoted lands below target
        let overshoot = quote.token_amount * U256::from(11u64) / U256::from(10u64);
        assert_eq!(
            f.vault.try_decrease_leverage(overshoot, U256::zero()),
            Err(LeverageError::RebalanceOutOfRange.into())
        );
    }

    #[test]
    fn test_quote_counts_idle_vault_balance() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));
        push_above_upper_bound(&mut f);

        // someone donates debt tokens to the vault
        f.debt.mint(f.vault.address().clone(), e18(10));

        let gross = f.vault.get_amount_to_reach_target_leverage(false);
        let net = f.vault.get_amount_to_reach_target_leverage(true);
        assert_eq!(net.direction, RebalanceDirection::Decrease);
        assert_eq!(net.token_amount, gross.token_amount - e18(10));

        let keeper = f.env.get_account(3);
        f.debt.mint(keeper, net.token_amount);
        f.env.set_caller(keeper);
        f.debt.approve(f.vault.address().clone(), net.token_amount);
        f.vault.decrease_leverage(net.token_amount, U256::zero());

        Fixture::assert_close(f.vault.get_current_leverage_bps(), bps(TARGET_LEVERAGE_BPS), bps(100));
        assert_eq!(f.debt.balance_of(f.vault.address().clone()), U256::zero());
    }

    #[test]
    fn test_position_reads_and_conversions() {
        let mut f = setup();
        f.deposit(f.env.get_account(1), e18(100));

        let position = f.vault.get_total_collateral_and_debt_in_base();
        assert_eq!(position.total_collateral_base, U256::from(10_000_000_000u64));
        assert_eq!(position.total_debt_base, U256::from(6_666_666_666u64));

        f.set_prices(85, 115);
        let collateral = f.collateral.address().clone();
        for amount in [1u64, 999, 123_456_789, 10_000_000_000] {
            let base = U256::from(amount);
            let tokens = f.vault.convert_from_base_currency_to_token(base, collateral);
            let back = f.vault.convert_from_token_to_base_currency(tokens, collateral);
            Fixture::assert_close(back, base, U256::one());
        }
    }

    #[test]
    fn test_faulty_pool_short_borrow_detected() {
        let mut f = setup();
        let mut shorting = ShortingPool::deploy(&f.env, ShortingPoolInitArgs {
            price_oracle: f.oracle.address().clone(),
            max_ltv_bps: U256::from(950_000u64),
        });
        shorting.list_reserve(f.collateral.address().clone());
        shorting.list_reserve(f.debt.address().clone());
        f.debt.mint(shorting.address().clone(), e18(1_000));

        let mut vault = deploy_vault_on(&f, shorting.address().clone());
        let user = f.env.get_account(1);
        f.collateral.mint(user, e18(100));
        f.env.set_caller(user);
        f.collateral.approve(vault.address().clone(), e18(100));

        assert_eq!(
            vault.try_deposit(e18(100), user),
            Err(LeverageError::BalanceDeltaMismatch.into())
        );
        assert_eq!(f.collateral.balance_of(user), e18(100));
    }

    #[test]
    fn test_share_transfers() {
        let mut f = setup();
        let user = f.env.get_account(1);
        let friend = f.env.get_account(2);
        f.deposit(user, e18(100));

        f.env.set_caller(user);
        f.vault.transfer(friend, e18(100));
        assert_eq!(f.vault.balance_of(friend), e18(100));
        assert_eq!(f.vault.max_redeem(friend), e18(100));
        assert_eq!(f.vault.max_withdraw(friend), f.vault.preview_redeem(e18(100)));
    }

    #[test]
    fn test_owner_configuration() {
        let mut f = setup();
        f.vault.set_leverage_bounds(bps(2_500_000), bps(3_500_000), bps(5_000_000));
        assert_eq!(f.vault.get_lower_bound_bps(), bps(2_500_000));
        assert_eq!(f.vault.get_target_leverage_bps(), bps(3_500_000));
        assert_eq!(f.vault.get_upper_bound_bps(), bps(5_000_000));

        assert_eq!(
            f.vault.try_set_leverage_bounds(bps(4_000_000), bps(3_000_000), bps(5_000_000)),
            Err(LeverageError::InvalidLeverageBounds.into())
        );
        assert_eq!(
            f.vault.try_set_leverage_bounds(bps(900_000), bps(3_000_000), bps(5_000_000)),
            Err(LeverageError::InvalidLeverageBounds.into())
        );

        f.vault.set_max_subsidy_bps(bps(100_000));
        assert_eq!(f.vault.get_max_subsidy_bps(), bps(100_000));
        // 50% * (350% - 100%) >= 100%
        assert_eq!(
            f.vault.try_set_max_subsidy_bps(bps(500_000)),
            Err(LeverageError::InvalidSubsidy.into())
        );

        f.env.set_caller(f.env.get_account(1));
        assert_eq!(
            f.vault.try_set_max_subsidy_bps(U256::zero()),
            Err(LeverageError::Unauthorized.into())
        );
        assert_eq!(
            f.vault.try_set_leverage_bounds(bps(LOWER_BOUND_BPS), bps(TARGET_LEVERAGE_BPS), bps(UPPER_BOUND_BPS)),
            Err(LeverageError::Unauthorized.into())
        );
    }

    #[test]
    fn test_rescue_token() {
        let mut f = setup();
        let mut stray = Token::deploy(&f.env, TokenInitArgs {
            name: String::from("Stray"),
            symbol: String::from("STR"),
            decimals: 6,
        });
        stray.mint(f.vault.address().clone(), U256::from(5_000u64));
        f.collateral.mint(f.vault.address().clone(), e18(1));

        let to = f.env.get_account(4);
        f.vault.rescue_token(stray.address().clone(), to, U256::from(5_000u64));
        assert_eq!(stray.balance_of(to), U256::from(5_000u64));

        assert_eq!(
            f.vault.try_rescue_token(f.collateral.address().clone(), to, e18(1)),
            Err(LeverageError::RestrictedAssetRescue.into())
        );
        assert_eq!(
            f.vault.try_rescue_token(f.debt.address().clone(), to, U256::zero()),
            Err(LeverageError::RestrictedAssetRescue.into())
        );

        f.env.set_caller(to);
        assert_eq!(
            f.vault.try_rescue_token(stray.address().clone(), to, U256::zero()),
            Err(LeverageError::Unauthorized.into())
        );
    }
}
