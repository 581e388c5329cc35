mod common;

use common::*;
use task_market::{Market, MarketError};

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_register_and_read_profile() {
    let mut market = setup();
    assert!(!market.get_user_profile(&worker()).exists);

    market
        .register_user(
            worker(),
            "Ada",
            "ada@example.org",
            "Compilers and\nparsers",
            "https://ada.example.org",
            skills(&["rust", "solidity"]),
        )
        .unwrap();

    let profile = market.get_user_profile(&worker());
    assert!(profile.exists);
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.registered_at, START);
    assert_eq!(market.users().get_user_skills(&worker()), skills(&["rust", "solidity"]));
    assert!(market.users().is_user_registered(&worker()));
    assert_eq!(market.events().last().map(|e| e.name()), Some("UserRegistered"));

    assert_err(
        market.register_user(worker(), "Ada", "", "", "", vec![]),
        MarketError::UserAlreadyRegistered,
    );
}

#[test]
fn test_profile_validation() {
    let mut market = setup();

    assert_err(
        market.register_user(worker(), "", "", "", "", vec![]),
        MarketError::EmptyContent,
    );
    assert_err(
        market.register_user(worker(), "Ada", "ada@exämple.org", "", "", vec![]),
        MarketError::InvalidStringInput,
    );
    assert_err(
        market.register_user(worker(), "Ada", "", "", "", vec!["x".repeat(33)]),
        MarketError::StringTooLong,
    );
    let too_many: Vec<String> = (0..21).map(|i| format!("skill{}", i)).collect();
    assert_err(
        market.register_user(worker(), "Ada", "", "", "", too_many),
        MarketError::StringTooLong,
    );
    assert_eq!(market.users().user_count(), 0);
}

#[test]
fn test_updates_require_registration() {
    let mut market = setup();

    assert_err(
        market.update_user_profile(worker(), "Ada", "", "", ""),
        MarketError::UserNotRegistered,
    );
    assert_err(
        market.update_user_skills(worker(), skills(&["rust"])),
        MarketError::UserNotRegistered,
    );

    market
        .register_user(worker(), "Ada", "", "", "", vec![])
        .unwrap();
    market
        .update_user_profile(worker(), "Ada L.", "ada@example.org", "Bio", "")
        .unwrap();
    market
        .update_user_skills(worker(), skills(&["rust", "anchor", "borsh"]))
        .unwrap();

    let profile = market.get_user_profile(&worker());
    assert_eq!(profile.name, "Ada L.");
    assert_eq!(profile.email, "ada@example.org");
    assert_eq!(profile.skills.len(), 3);
    assert_eq!(
        market.events().names().last().copied(),
        Some("UserSkillsUpdated")
    );
}

#[test]
fn test_market_from_config_file() {
    let path = std::env::temp_dir().join("task-market-users-config.json");
    std::fs::write(
        &path,
        r#"{ "owner": "11111111111111111111111111111112", "platform_fee_bps": 100 }"#,
    )
    .unwrap();

    let market = Market::from_json_file(&path).unwrap();
    assert_eq!(market.platform_fee(), 100);
    assert_eq!(market.config().treasury, market.config().owner);

    std::fs::remove_file(&path).unwrap();
}
