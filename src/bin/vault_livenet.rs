//! Livenet deploy and demo binary for the sUSD vault.
//!
//! Run with:
//! - Deploy only:       VAULT_LIVENET_MODE=deploy cargo run --bin vault_livenet --features=livenet
//! - Deploy + demo:     VAULT_LIVENET_MODE=deploy_and_demo cargo run --bin vault_livenet --features=livenet
//! - Demo on existing:  VAULT_LIVENET_MODE=demo VAULT_EXISTING_VAULT=... VAULT_EXISTING_SUSD=... VAULT_EXISTING_FEED=... cargo run ...
//! - Query a position:  VAULT_LIVENET_MODE=query VAULT_QUERY_POSITION_ID=0 VAULT_EXISTING_VAULT=... ... cargo run ...
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS        (base URL; Odra appends "/rpc")
//! - ODRA_CASPER_LIVENET_EVENTS_URL          (required by Odra; placeholder URL is OK here)
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS          (motes, per contract deploy)
//! - ODRA_CASPER_LIVENET_CALL_GAS            (motes)
//! - VAULT_EXISTING_FEED / VAULT_EXISTING_SUSD / VAULT_EXISTING_VAULT
//!                                           (64-hex or formatted "hash-..."/"contract-package-...")
//! - VAULT_FEED_DECIMALS                     (default: 8)
//! - VAULT_FEED_ANSWER                       (default: 2000000, i.e. $0.02 at 8 decimals)
//! - VAULT_DEMO_COLLATERAL_CSPR              (default: 100)
//! - VAULT_DEMO_MINT_CENTS                   (default: 100, i.e. 1 sUSD)
//! - VAULT_DEMO_DURATION_DAYS                (default: 30)
//! - VAULT_DEMO_ROLLOVER_DAYS                (default: 7; 0 skips the rollover)
//! - VAULT_DEMO_REPAY                        ("1" to repay at the end; default: 1)

use odra::casper_types::{U256, U512};
use odra::host::{Deployer, HostRef, HostRefLoader};
use odra::prelude::*;

use susd_vault::ledger::PositionStatus;
use susd_vault::price_feed::{MockPriceFeed, MockPriceFeedInitArgs};
use susd_vault::tokens::{SyntheticUsd, SyntheticUsdHostRef, SyntheticUsdInitArgs};
use susd_vault::vault::{SyntheticVault, SyntheticVaultHostRef, SyntheticVaultInitArgs};

const MOTES_PER_CSPR: u64 = 1_000_000_000;
const MOTES_TO_WAD_FACTOR: u128 = 1_000_000_000;
const WAD_PER_CENT: u128 = 10_000_000_000_000_000;
const SECONDS_PER_DAY: u64 = 86_400;

const DEFAULT_DEPLOY_GAS_MOTES: u64 = 500_000_000_000; // 500 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR

fn main() {
    println!("============================================");
    println!("  sUSD Vault: Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("VAULT_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_deploy = mode == "deploy" || mode == "deploy_and_demo";
    let should_demo = mode == "demo" || mode == "deploy_and_demo";
    let should_query = mode == "query";

    let deploy_gas = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS", DEFAULT_DEPLOY_GAS_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);

    let feed_decimals = read_u64_env("VAULT_FEED_DECIMALS", 8) as u8;
    let feed_answer = read_u64_env("VAULT_FEED_ANSWER", 2_000_000) as i64;

    let collateral_cspr = read_u64_env("VAULT_DEMO_COLLATERAL_CSPR", 100);
    let mint_cents = read_u64_env("VAULT_DEMO_MINT_CENTS", 100);
    let duration_days = read_u64_env("VAULT_DEMO_DURATION_DAYS", 30);
    let rollover_days = read_u64_env("VAULT_DEMO_ROLLOVER_DAYS", 7);
    let repay = std::env::var("VAULT_DEMO_REPAY")
        .map(|v| v.trim() != "0" && !v.trim().is_empty())
        .unwrap_or(true);

    let collateral_motes = U512::from(collateral_cspr) * U512::from(MOTES_PER_CSPR);
    let mint_wad = U256::from(mint_cents) * U256::from(WAD_PER_CENT);

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy={} ({} CSPR), calls={} ({} CSPR)",
        deploy_gas,
        deploy_gas / MOTES_PER_CSPR,
        call_gas,
        call_gas / MOTES_PER_CSPR
    );
    println!(
        "[INFO] Demo params: collateral={} CSPR, mint={} cents, duration={}d, rollover={}d, repay={}",
        collateral_cspr, mint_cents, duration_days, rollover_days, repay
    );
    println!();

    // ==========================================
    // Step 1: Deploy (or reuse) price feed
    // ==========================================
    let feed_addr = if should_deploy {
        println!("[STEP 1] Deploying mock price feed...");
        env.set_gas(deploy_gas);
        let feed = MockPriceFeed::deploy(
            &env,
            MockPriceFeedInitArgs {
                decimals: feed_decimals,
                initial_answer: feed_answer,
            },
        );
        println!("[OK] Feed deployed at: {:?}", feed.address());
        println!("     Decimals: {}, answer: {}", feed.decimals(), feed_answer);
        println!();
        feed.address()
    } else {
        println!("[STEP 1] Reusing existing price feed...");
        let addr = existing_address("VAULT_EXISTING_FEED", &mode);
        println!("[OK] Feed: {:?}", addr);
        println!();
        addr
    };

    // ==========================================
    // Step 2: Deploy (or reuse) sUSD
    // ==========================================
    let mut susd = if should_deploy {
        println!("[STEP 2] Deploying sUSD token...");
        env.set_gas(deploy_gas);
        let susd = SyntheticUsd::deploy(&env, SyntheticUsdInitArgs { minter: env.caller() });
        println!("[OK] sUSD deployed at: {:?}", susd.address());
        println!("     Symbol: {}", susd.symbol());
        println!();
        susd
    } else {
        println!("[STEP 2] Reusing existing sUSD token...");
        let addr = existing_address("VAULT_EXISTING_SUSD", &mode);
        println!("[OK] sUSD: {:?}", addr);
        println!();
        SyntheticUsd::load(&env, addr)
    };
    let susd_addr = susd.address();

    // ==========================================
    // Step 3: Deploy (or reuse) vault
    // ==========================================
    let mut vault = if should_deploy {
        println!("[STEP 3] Deploying vault...");
        env.set_gas(deploy_gas);
        let vault = SyntheticVault::deploy(
            &env,
            SyntheticVaultInitArgs {
                susd: susd_addr,
                price_feed: feed_addr,
            },
        );
        println!("[OK] Vault deployed at: {:?}", vault.address());
        println!();
        vault
    } else {
        println!("[STEP 3] Reusing existing vault...");
        let addr = existing_address("VAULT_EXISTING_VAULT", &mode);
        println!("[OK] Vault: {:?}", addr);
        println!();
        SyntheticVault::load(&env, addr)
    };
    let vault_addr = vault.address();

    // ==========================================
    // Step 4: Hand sUSD minting to the vault
    // ==========================================
    if should_deploy {
        println!("[STEP 4] Setting sUSD minter to vault...");
        env.set_gas(call_gas);
        susd.set_minter(vault_addr);
        println!("[OK] sUSD minter: {:?}", susd.minter());
        println!();
    }

    // ==========================================
    // Demo: open -> roll over -> repay
    // ==========================================
    if should_demo {
        println!("[INFO] Price: {} wad/CSPR", vault.price());

        println!("[DEMO 1] Opening position: {} CSPR, {} cents sUSD, {} days...", collateral_cspr, mint_cents, duration_days);
        env.set_gas(call_gas);
        let id = vault
            .with_tokens(collateral_motes)
            .open(mint_wad, duration_days * SECONDS_PER_DAY);
        println!("[OK] Position {} opened.", id);
        print_position_info(&vault, id, &susd);

        if rollover_days > 0 {
            let added = rollover_days * SECONDS_PER_DAY;
            let fee_wad = vault.quote_rollover_fee(id, added);
            let fee_motes = wad_to_motes_ceil(fee_wad);
            println!("[DEMO 2] Rolling over {} days, fee {} motes...", rollover_days, fee_motes);
            env.set_gas(call_gas);
            vault.with_tokens(fee_motes).roll_over(id, added);
            println!("[OK] Rolled over.");
            print_position_info(&vault, id, &susd);
        }

        if repay {
            println!("[DEMO 3] Approving and repaying position {}...", id);
            let debt = vault.get_position(id).debt_wad;
            env.set_gas(call_gas);
            susd.approve(vault_addr, debt);
            env.set_gas(call_gas);
            vault.repay(id);
            println!("[OK] Repaid.");
            print_position_info(&vault, id, &susd);
        }
    }

    // ==========================================
    // Query mode: Output position as JSON
    // ==========================================
    if should_query {
        let id = read_u64_env("VAULT_QUERY_POSITION_ID", 0);
        let pos = vault.get_position(id);
        println!(
            "VAULT_POSITION_JSON={{\"id\":{},\"owner\":\"{:?}\",\"collateral_motes\":\"{}\",\"debt_wad\":\"{}\",\"start_time\":{},\"maturity\":{},\"open\":{},\"health_factor\":\"{}\"}}",
            pos.id,
            pos.owner,
            pos.collateral_motes,
            pos.debt_wad,
            pos.start_time,
            pos.maturity,
            pos.is_open(),
            vault.health_factor(id)
        );
        return;
    }

    output_deploy_json(feed_addr, susd_addr, vault_addr);
}

fn print_position_info(vault: &SyntheticVaultHostRef, id: u64, susd: &SyntheticUsdHostRef) {
    let pos = vault.get_position(id);
    let status_str = match pos.status {
        PositionStatus::Open => "Open",
        PositionStatus::Closed => "Closed",
    };
    println!("     owner: {:?}", pos.owner);
    println!(
        "     collateral: {} motes ({} CSPR)",
        pos.collateral_motes,
        pos.collateral_motes.as_u64() / MOTES_PER_CSPR
    );
    println!("     debt: {} wad", pos.debt_wad);
    println!("     maturity: {} (started {})", pos.maturity, pos.start_time);
    println!("     status: {}", status_str);
    println!("     health_factor: {}", vault.health_factor(id));
    println!("     total_collateral: {}", vault.total_collateral());
    println!("     total_debt: {}", vault.total_debt());
    println!("     owner sUSD balance: {}", susd.balance_of(pos.owner));
    println!();
}

fn wad_to_motes_ceil(wad: U256) -> U512 {
    let factor = U256::from(MOTES_TO_WAD_FACTOR);
    U512::from(((wad + factor - U256::one()) / factor).as_u128())
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned.parse::<u64>().unwrap_or(default_value)
        }
        Err(_) => default_value,
    }
}

fn existing_address(var: &str, mode: &str) -> Address {
    let raw = std::env::var(var).unwrap_or_else(|_| panic!("{} must be set for mode={}", var, mode));
    parse_contract_address(&raw)
}

fn output_deploy_json(feed_addr: Address, susd_addr: Address, vault_addr: Address) {
    let chain_name =
        std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_else(|_| "casper-test".to_string());
    let node_url = std::env::var("ODRA_CASPER_LIVENET_NODE_ADDRESS")
        .unwrap_or_else(|_| "https://node.testnet.casper.network".to_string());

    println!(
        r#"VAULT_DEPLOY_JSON={{"chain_name":"{}","node_url":"{}","feed_contract_hash":"{}","susd_contract_hash":"{}","vault_contract_hash":"{}","deployed_at":"{}"}}"#,
        chain_name,
        node_url,
        format_address_hash(&feed_addr),
        format_address_hash(&susd_addr),
        format_address_hash(&vault_addr),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

fn format_address_hash(addr: &Address) -> String {
    let debug_str = format!("{:?}", addr);
    let (Some(start), Some(end)) = (debug_str.find('['), debug_str.rfind(']')) else {
        return debug_str;
    };
    debug_str[start + 1..end]
        .split(", ")
        .filter_map(|part| part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")))
        .collect()
}

fn parse_contract_address(raw: &str) -> Address {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::contracts::ContractPackageHash;

    fn decode_hex_32(s: &str) -> [u8; 32] {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            panic!("Invalid address hash (expected 64 hex): {}", s);
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .unwrap_or_else(|_| panic!("Invalid hex in address: {}", s));
        }
        out
    }

    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("account-hash-") {
        return Address::Account(AccountHash::new(decode_hex_32(hex)));
    }
    let hex = ["contract-package-", "package-", "hash-"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    Address::Contract(ContractPackageHash::new(decode_hex_32(hex)))
}
