//! CLI tool for deploying a leveraged vault stack and keeping it balanced.

use leverage_vault_contracts::dex::SwapPool;
use leverage_vault_contracts::flash::FlashLender;
use leverage_vault_contracts::lending::{LendingPool, PriceOracle};
use leverage_vault_contracts::leverage::{LeveragedVault, RebalanceDirection};
use leverage_vault_contracts::token::{Token, TokenHostRef};
use leverage_vault_contracts::wrappers::{LeveragedDepositor, LeveragedRedeemer};
use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::{Address, Addressable};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Oracle prices carry 8 decimals
const BASE_CURRENCY_UNIT: u64 = 100_000_000;

/// Deploys the lending side: price oracle and lending pool. Reserves are
/// listed by `VaultStackDeployScript` once the tokens exist.
pub struct LendingDeployScript;

impl DeployScript for LendingDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use leverage_vault_contracts::lending::lending_pool::LendingPoolInitArgs;
        use leverage_vault_contracts::lending::price_oracle::PriceOracleInitArgs;

        let oracle = PriceOracle::load_or_deploy(
            &env,
            PriceOracleInitArgs {
                base_currency_unit: U256::from(BASE_CURRENCY_UNIT),
            },
            container,
            300_000_000_000
        )?;

        let _pool = LendingPool::load_or_deploy(
            &env,
            LendingPoolInitArgs {
                price_oracle: oracle.address().clone(),
                // 90% max loan-to-value
                max_ltv_bps: U256::from(900_000u64),
            },
            container,
            400_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys collateral and debt tokens, swap pool, flash lender, a 2x/3x/4x
/// vault and both wrappers. Requires `LendingDeployScript` first.
pub struct VaultStackDeployScript;

impl DeployScript for VaultStackDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use leverage_vault_contracts::dex::swap_pool::SwapPoolInitArgs;
        use leverage_vault_contracts::flash::flash_lender::FlashLenderInitArgs;
        use leverage_vault_contracts::leverage::vault::LeveragedVaultInitArgs;
        use leverage_vault_contracts::token::TokenInitArgs;
        use leverage_vault_contracts::wrappers::depositor::LeveragedDepositorInitArgs;
        use leverage_vault_contracts::wrappers::redeemer::LeveragedRedeemerInitArgs;

        // the debt token is not tracked by the container; skip if already deployed
        if container.contract_ref::<LeveragedVault>(env).is_ok() {
            return Ok(());
        }

        let oracle = container.contract_ref::<PriceOracle>(env)?;
        let mut pool = container.contract_ref::<LendingPool>(env)?;

        let collateral = Token::load_or_deploy(
            &env,
            TokenInitArgs {
                name: String::from("Collateral"),
                symbol: String::from("COL"),
                decimals: 18,
            },
            container,
            300_000_000_000
        )?;

        env.set_gas(300_000_000_000);
        let debt = Token::deploy(env, TokenInitArgs {
            name: String::from("Debt"),
            symbol: String::from("DEBT"),
            decimals: 18,
        });

        env.set_gas(100_000_000_000);
        pool.try_list_reserve(collateral.address().clone())?;
        env.set_gas(100_000_000_000);
        pool.try_list_reserve(debt.address().clone())?;

        let dex = SwapPool::load_or_deploy(
            &env,
            SwapPoolInitArgs {
                token_a: collateral.address().clone(),
                token_b: debt.address().clone(),
            },
            container,
            400_000_000_000
        )?;

        let lender = FlashLender::load_or_deploy(
            &env,
            FlashLenderInitArgs {
                fee_bps: U256::zero(),
            },
            container,
            300_000_000_000
        )?;

        let _vault = LeveragedVault::load_or_deploy(
            &env,
            LeveragedVaultInitArgs {
                name: String::from("Leveraged COL/DEBT"),
                symbol: String::from("lvCOL"),
                collateral_token: collateral.address().clone(),
                debt_token: debt.address().clone(),
                lending_pool: pool.address().clone(),
                price_oracle: oracle.address().clone(),
                lower_bound_bps: U256::from(2_000_000u64),
                target_leverage_bps: U256::from(3_000_000u64),
                upper_bound_bps: U256::from(4_000_000u64),
                max_subsidy_bps: U256::from(50_000u64),
                // $1 deposit floor
                min_deposit_base: U256::from(BASE_CURRENCY_UNIT),
                extra_restricted_tokens: Vec::new(),
            },
            container,
            800_000_000_000
        )?;

        let _depositor = LeveragedDepositor::load_or_deploy(
            &env,
            LeveragedDepositorInitArgs {
                flash_lender: lender.address().clone(),
                dex: dex.address().clone(),
            },
            container,
            500_000_000_000
        )?;

        let _redeemer = LeveragedRedeemer::load_or_deploy(
            &env,
            LeveragedRedeemerInitArgs {
                flash_lender: lender.address().clone(),
                dex: dex.address().clone(),
            },
            container,
            500_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys everything.
pub struct FullStackDeployScript;

impl DeployScript for FullStackDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        LendingDeployScript.deploy(env, container)?;
        VaultStackDeployScript.deploy(env, container)?;
        Ok(())
    }
}

/// Scenario printing the vault's leverage state.
pub struct LeverageStatusScenario;

impl Scenario for LeverageStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args
    ) -> Result<(), Error> {
        let vault = container.contract_ref::<LeveragedVault>(env)?;

        let position = vault.get_total_collateral_and_debt_in_base();
        let quote = vault.get_amount_to_reach_target_leverage(false);

        println!("Leverage:        {} bps", vault.get_current_leverage_bps());
        println!(
            "Bounds:          {} / {} / {} bps",
            vault.get_lower_bound_bps(),
            vault.get_target_leverage_bps(),
            vault.get_upper_bound_bps()
        );
        println!("Too imbalanced:  {}", vault.is_too_imbalanced());
        println!("Subsidy:         {} bps", vault.get_current_subsidy_bps());
        println!("Collateral base: {}", position.total_collateral_base);
        println!("Debt base:       {}", position.total_debt_base);
        println!("Share supply:    {}", vault.total_supply());
        println!("Rebalance:       {:?} {}", quote.direction, quote.token_amount);
        Ok(())
    }
}

impl ScenarioMetadata for LeverageStatusScenario {
    const NAME: &'static str = "leverage-status";
    const DESCRIPTION: &'static str = "Prints leverage, bounds, subsidy and the rebalance quote of the vault";
}

/// Scenario rebalancing the vault toward target leverage with the caller's funds.
pub struct RebalanceScenario;

impl Scenario for RebalanceScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "use_vault_balance",
                "Count tokens already idle in the vault toward the amount",
                NamedCLType::Bool,
            ),
            CommandArg::new(
                "min_output",
                "Minimum tokens to receive back",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut vault = container.contract_ref::<LeveragedVault>(env)?;
        let use_vault_balance = args.get_single::<bool>("use_vault_balance")?;
        let min_output = args.get_single::<U256>("min_output")?;

        let quote = vault.get_amount_to_reach_target_leverage(use_vault_balance);
        let token = match quote.direction {
            RebalanceDirection::None => {
                println!("Vault is at target leverage, nothing to do");
                return Ok(());
            }
            RebalanceDirection::Increase => vault.collateral_token(),
            RebalanceDirection::Decrease => vault.debt_token(),
        };

        let vault_address: Address = vault.address().clone();
        if !quote.token_amount.is_zero() {
            let mut token_ref = TokenHostRef::new(token, env.clone());
            env.set_gas(100_000_000_000);
            token_ref.try_approve(vault_address, quote.token_amount)?;
        }

        env.set_gas(500_000_000_000);
        let received = match quote.direction {
            RebalanceDirection::Increase => vault.try_increase_leverage(quote.token_amount, min_output)?,
            _ => vault.try_decrease_leverage(quote.token_amount, min_output)?,
        };

        println!("Provided {} and received {}", quote.token_amount, received);
        println!("Leverage now {} bps", vault.get_current_leverage_bps());
        Ok(())
    }
}

impl ScenarioMetadata for RebalanceScenario {
    const NAME: &'static str = "rebalance";
    const DESCRIPTION: &'static str = "Moves the vault back to target leverage for the subsidy";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for leveraged vault contracts")
        // Deploy scripts
        .deploy(LendingDeployScript)
        .deploy(VaultStackDeployScript)
        .deploy(FullStackDeployScript)
        // Contract references
        .contract::<Token>()
        .contract::<PriceOracle>()
        .contract::<LendingPool>()
        .contract::<SwapPool>()
        .contract::<FlashLender>()
        .contract::<LeveragedVault>()
        .contract::<LeveragedDepositor>()
        .contract::<LeveragedRedeemer>()
        // Scenarios
        .scenario(LeverageStatusScenario)
        .scenario(RebalanceScenario)
        .build()
        .run();
}
