//! Full-stack deployment shared by the vault and wrapper tests

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;
use odra::ContractRef;
use crate::events::{Approval, Transfer};
use crate::flash::FlashLoanAdapterContractRef;
use crate::leverage::LeverageVaultAdapterContractRef;
use crate::dex::swap_pool::{SwapPool, SwapPoolHostRef, SwapPoolInitArgs};
use crate::flash::flash_lender::{FlashLender, FlashLenderHostRef, FlashLenderInitArgs};
use crate::lending::lending_pool::{LendingPool, LendingPoolHostRef, LendingPoolInitArgs};
use crate::lending::price_oracle::{PriceOracle, PriceOracleHostRef, PriceOracleInitArgs};
use crate::leverage::vault::{LeveragedVault, LeveragedVaultHostRef, LeveragedVaultInitArgs};
use crate::token::{Token, TokenHostRef, TokenInitArgs};
use crate::wrappers::depositor::{
    LeveragedDepositor, LeveragedDepositorContractRef, LeveragedDepositorHostRef, LeveragedDepositorInitArgs,
};
use crate::wrappers::redeemer::{
    LeveragedRedeemer, LeveragedRedeemerContractRef, LeveragedRedeemerHostRef, LeveragedRedeemerInitArgs,
};

/// Oracle base currency unit: prices carry 8 decimals
pub const BASE_UNIT: u64 = 100_000_000;

pub const LOWER_BOUND_BPS: u64 = 2_000_000;
pub const TARGET_LEVERAGE_BPS: u64 = 3_000_000;
pub const UPPER_BOUND_BPS: u64 = 4_000_000;
pub const MAX_SUBSIDY_BPS: u64 = 50_000;
/// $1 deposit floor
pub const MIN_DEPOSIT_BASE: u64 = BASE_UNIT;

pub fn e18(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

/// `dollars_x100 / 100` dollars in oracle units
pub fn price(dollars_x100: u64) -> U256 {
    U256::from(dollars_x100) * U256::from(BASE_UNIT) / U256::from(100u64)
}

pub struct Fixture {
    pub env: HostEnv,
    pub owner: Address,
    pub collateral: TokenHostRef,
    pub debt: TokenHostRef,
    pub oracle: PriceOracleHostRef,
    pub pool: LendingPoolHostRef,
    pub dex: SwapPoolHostRef,
    pub lender: FlashLenderHostRef,
    pub vault: LeveragedVaultHostRef,
    pub depositor: LeveragedDepositorHostRef,
    pub redeemer: LeveragedRedeemerHostRef,
}

fn deploy_token(env: &HostEnv, name: &str, symbol: &str) -> TokenHostRef {
    Token::deploy(env, TokenInitArgs {
        name: String::from(name),
        symbol: String::from(symbol),
        decimals: 18,
    })
}

/// Tokens, $1 prices, a 95% LTV pool, a deep 1:1 swap pool, a fee-free
/// flash lender, a 2x/3x/4x vault and both wrappers. Caller is left as
/// the owner (account 0).
pub fn setup() -> Fixture {
    let env = odra_test::env();
    let owner = env.get_account(0);
    env.set_caller(owner);

    let mut collateral = deploy_token(&env, "Collateral", "COL");
    let mut debt = deploy_token(&env, "Debt", "DEBT");

    let mut oracle = PriceOracle::deploy(&env, PriceOracleInitArgs {
        base_currency_unit: U256::from(BASE_UNIT),
    });
    oracle.set_price(collateral.address().clone(), price(100));
    oracle.set_price(debt.address().clone(), price(100));

    let mut pool = LendingPool::deploy(&env, LendingPoolInitArgs {
        price_oracle: oracle.address().clone(),
        max_ltv_bps: U256::from(950_000u64),
    });
    pool.list_reserve(collateral.address().clone());
    pool.list_reserve(debt.address().clone());
    debt.mint(pool.address().clone(), e18(10_000_000));

    let mut dex = SwapPool::deploy(&env, SwapPoolInitArgs {
        token_a: collateral.address().clone(),
        token_b: debt.address().clone(),
    });
    collateral.mint(owner, e18(1_000_000));
    debt.mint(owner, e18(1_000_000));
    collateral.approve(dex.address().clone(), e18(1_000_000));
    debt.approve(dex.address().clone(), e18(1_000_000));
    // SwapPool sorts by address; both sides are equal so ordering is moot
    dex.add_liquidity(e18(1_000_000), e18(1_000_000));

    let lender = FlashLender::deploy(&env, FlashLenderInitArgs {
        fee_bps: U256::zero(),
    });
    debt.mint(lender.address().clone(), e18(1_000_000));

    let vault = LeveragedVault::deploy(&env, LeveragedVaultInitArgs {
        name: String::from("Leveraged COL/DEBT"),
        symbol: String::from("lvCOL"),
        collateral_token: collateral.address().clone(),
        debt_token: debt.address().clone(),
        lending_pool: pool.address().clone(),
        price_oracle: oracle.address().clone(),
        lower_bound_bps: U256::from(LOWER_BOUND_BPS),
        target_leverage_bps: U256::from(TARGET_LEVERAGE_BPS),
        upper_bound_bps: U256::from(UPPER_BOUND_BPS),
        max_subsidy_bps: U256::from(MAX_SUBSIDY_BPS),
        min_deposit_base: U256::from(MIN_DEPOSIT_BASE),
        extra_restricted_tokens: Vec::new(),
    });

    let depositor = LeveragedDepositor::deploy(&env, LeveragedDepositorInitArgs {
        flash_lender: lender.address().clone(),
        dex: dex.address().clone(),
    });
    let redeemer = LeveragedRedeemer::deploy(&env, LeveragedRedeemerInitArgs {
        flash_lender: lender.address().clone(),
        dex: dex.address().clone(),
    });

    Fixture {
        env,
        owner,
        collateral,
        debt,
        oracle,
        pool,
        dex,
        lender,
        vault,
        depositor,
        redeemer,
    }
}

impl Fixture {
    /// Mint `amount` collateral to `user` and deposit it straight into the vault
    pub fn deposit(&mut self, user: Address, amount: U256) -> U256 {
        self.collateral.mint(user, amount);
        self.env.set_caller(user);
        self.collateral.approve(self.vault.address().clone(), amount);
        let shares = self.vault.deposit(amount, user);
        self.env.set_caller(self.owner);
        shares
    }

    /// Reprice both assets, in cents
    pub fn set_prices(&mut self, collateral_cents: u64, debt_cents: u64) {
        self.env.set_caller(self.owner);
        self.oracle.set_price(self.collateral.address().clone(), price(collateral_cents));
        self.oracle.set_price(self.debt.address().clone(), price(debt_cents));
    }

    /// |a - b| <= tolerance
    pub fn assert_close(a: U256, b: U256, tolerance: U256) {
        let diff = if a > b { a - b } else { b - a };
        assert!(diff <= tolerance, "{} and {} differ by more than {}", a, b, tolerance);
    }
}

/// Entry point `ReentrantToken` calls back into while armed
#[odra::odra_type]
pub enum Reentry {
    Vault,
    Depositor,
    Redeemer,
    Lender,
}

/// CEP-18 token that, once armed, calls back into `target` from every
/// `transfer` and `transfer_from`
#[odra::module(events = [Transfer, Approval])]
pub struct ReentrantToken {
    inner: SubModule<Token>,
    armed: Var<bool>,
    target: Var<Address>,
    reentry: Var<Reentry>,
}

#[odra::module]
impl ReentrantToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.inner.init(name, symbol, decimals);
        self.armed.set(false);
    }

    pub fn arm(&mut self, target: Address, reentry: Reentry) {
        self.target.set(target);
        self.reentry.set(reentry);
        self.armed.set(true);
    }

    pub fn disarm(&mut self) {
        self.armed.set(false);
    }

    pub fn name(&self) -> String {
        self.inner.name()
    }

    pub fn symbol(&self) -> String {
        self.inner.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.inner.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.inner.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.inner.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.inner.allowance(owner, spender)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.reenter();
        self.inner.transfer(to, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.inner.approve(spender, amount)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.reenter();
        self.inner.transfer_from(from, to, amount)
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.inner.mint(to, amount);
    }
}

impl ReentrantToken {
    fn reenter(&mut self) {
        if !self.armed.get_or_default() {
            return;
        }
        let (Some(target), Some(reentry)) = (self.target.get(), self.reentry.get()) else {
            return;
        };
        let this = self.env().self_address();
        let one = U256::one();
        match reentry {
            Reentry::Vault => {
                LeverageVaultAdapterContractRef::new(self.env(), target).increase_leverage(one, U256::zero());
            }
            Reentry::Depositor => {
                LeveragedDepositorContractRef::new(self.env(), target).deposit(one, this, U256::zero(), Bytes::new(), this);
            }
            Reentry::Redeemer => {
                LeveragedRedeemerContractRef::new(self.env(), target).redeem(one, this, U256::zero(), Bytes::new(), this);
            }
            Reentry::Lender => {
                FlashLoanAdapterContractRef::new(self.env(), target).flash_loan(this, this, one, Bytes::new());
            }
        }
    }
}

impl Fixture {
    /// Reentrant collateral token, priced at $1 and listed on the pool, with
    /// a 2x/3x/4x vault on top of it
    pub fn reentrant_vault(&mut self) -> (ReentrantTokenHostRef, LeveragedVaultHostRef) {
        self.env.set_caller(self.owner);
        let token = ReentrantToken::deploy(&self.env, ReentrantTokenInitArgs {
            name: String::from("Reentrant"),
            symbol: String::from("RE"),
            decimals: 18,
        });
        self.oracle.set_price(token.address().clone(), price(100));
        self.pool.list_reserve(token.address().clone());

        let vault = LeveragedVault::deploy(&self.env, LeveragedVaultInitArgs {
            name: String::from("Leveraged RE/DEBT"),
            symbol: String::from("lvRE"),
            collateral_token: token.address().clone(),
            debt_token: self.debt.address().clone(),
            lending_pool: self.pool.address().clone(),
            price_oracle: self.oracle.address().clone(),
            lower_bound_bps: U256::from(LOWER_BOUND_BPS),
            target_leverage_bps: U256::from(TARGET_LEVERAGE_BPS),
            upper_bound_bps: U256::from(UPPER_BOUND_BPS),
            max_subsidy_bps: U256::from(MAX_SUBSIDY_BPS),
            min_deposit_base: U256::from(MIN_DEPOSIT_BASE),
            extra_restricted_tokens: Vec::new(),
        });
        (token, vault)
    }
}
