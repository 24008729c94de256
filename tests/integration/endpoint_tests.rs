use std::sync::Arc;

use eveapi::http_client::Method;
use eveapi::{Account, ApiKey, Char, Corp, Error, Eve, Map, MemoryCache, NullCache, Server};

use crate::common::test_helpers::{
    CACHED_UNTIL, CURRENT_TIME, CURRENT_TS, TestApi, error_body, param, success_body,
};

const WALLET: &str = r#"<rowset name="accounts" key="accountID" columns="accountID,accountKey,balance">
  <row accountID="4807144" accountKey="1000" balance="209127923.31" />
</rowset>"#;

const CORP_WALLETS: &str = r#"<rowset name="accounts" key="accountID" columns="accountID,accountKey,balance">
  <row accountID="4759" accountKey="1000" balance="74171957.08" />
  <row accountID="5687" accountKey="1001" balance="6.05" />
</rowset>"#;

const EMPTY_ROWSET: &str = r#"<rowset name="entries" key="refID" columns="refID" />"#;

#[test]
fn test_char_sends_character_id() {
    let harness = TestApi::new();
    harness.transport.respond("char/AccountBalance", success_body(WALLET));

    let character = Char::new(1234, harness.api.clone());
    let wallet = character.wallet_info(None).unwrap();

    assert_eq!(wallet.result.key, 1000);
    assert_eq!(wallet.timestamp, CURRENT_TS);
    let request = harness.transport.only_request();
    assert_eq!(
        request.url,
        "https://api.eveonline.com/char/AccountBalance.xml.aspx"
    );
    assert_eq!(param(&request.params, "characterID"), Some("1234"));
    assert_eq!(request.method(), Method::Post);
}

#[test]
fn test_wallet_envelope_is_shared() {
    // No cache, so only the prefetched envelope can avoid a second request
    let harness = TestApi::with_cache(Arc::new(NullCache));
    harness.transport.respond("char/AccountBalance", success_body(WALLET));

    let character = Char::new(1234, harness.api.clone());
    let envelope = character.wallet_envelope().unwrap();
    let info = character.wallet_info(Some(envelope.clone())).unwrap();
    let balance = character.wallet_balance(Some(envelope)).unwrap();

    assert_eq!(info.result.id, 4807144);
    assert!((balance.result - 209127923.31).abs() < 1e-6);
    assert_eq!(balance.expires, info.expires);
    assert_eq!(harness.transport.request_count(), 1);
}

#[test]
fn test_char_journal_paging_parameters() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("char/WalletJournal", success_body(EMPTY_ROWSET));

    let character = Char::new(1234, harness.api.clone());
    let journal = character.wallet_journal(Some(9000), Some(50)).unwrap();
    assert!(journal.result.is_empty());

    let request = harness.transport.only_request();
    assert_eq!(param(&request.params, "characterID"), Some("1234"));
    assert_eq!(param(&request.params, "fromID"), Some("9000"));
    assert_eq!(param(&request.params, "rowCount"), Some("50"));
}

#[test]
fn test_char_optional_parameters_are_omitted() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("char/KillMails", success_body(r#"<rowset name="kills" />"#));

    let character = Char::new(1234, harness.api.clone());
    assert!(character.kills(None).unwrap().result.is_empty());

    let request = harness.transport.only_request();
    assert_eq!(
        request.params,
        vec![("characterID".to_string(), "1234".to_string())]
    );
}

#[test]
fn test_char_kills_pages_backwards() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("char/KillMails", success_body(r#"<rowset name="kills" />"#));

    Char::new(1234, harness.api.clone())
        .kills(Some(63))
        .unwrap();

    let request = harness.transport.only_request();
    assert_eq!(param(&request.params, "beforeKillID"), Some("63"));
}

#[test]
fn test_corp_wallets_keyed_by_account() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("corp/AccountBalance", success_body(CORP_WALLETS));

    let wallets = Corp::new(harness.api.clone()).wallet_info(None).unwrap();
    assert_eq!(
        wallets.result.keys().copied().collect::<Vec<_>>(),
        vec![1000, 1001]
    );
    assert_eq!(wallets.result[&1001].id, 5687);
    assert!(harness.transport.only_request().params.is_empty());
}

#[test]
fn test_corp_journal_account_key() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("corp/WalletJournal", success_body(EMPTY_ROWSET));

    Corp::new(harness.api.clone())
        .wallet_journal(Some(1001), None, Some(25))
        .unwrap();

    let request = harness.transport.only_request();
    assert_eq!(param(&request.params, "accountKey"), Some("1001"));
    assert_eq!(param(&request.params, "rowCount"), Some("25"));
    assert_eq!(param(&request.params, "fromID"), None);
}

#[test]
fn test_corp_members_extended_flag() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("corp/MemberTracking", success_body(r#"<rowset name="members" />"#));

    let corp = Corp::new(harness.api.clone());
    corp.members(false).unwrap();
    corp.members(true).unwrap();

    let requests = harness.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(param(&requests[0].params, "extended"), None);
    assert_eq!(param(&requests[1].params, "extended"), Some("1"));
}

#[test]
fn test_corp_sheet_surfaces_api_error() {
    let harness = TestApi::new();
    harness.transport.respond(
        "corp/CorporationSheet",
        error_body(523, "Failed getting character information.", CURRENT_TIME, CACHED_UNTIL),
    );

    let err = Corp::new(harness.api.clone())
        .corporation_sheet(Some(150212025))
        .unwrap_err();
    assert_eq!(err.as_api_error().map(|e| e.code), Some(523));

    let request = harness.transport.only_request();
    assert_eq!(param(&request.params, "corporationID"), Some("150212025"));
}

#[test]
fn test_eve_name_lookups_send_lists() {
    let harness = TestApi::new();
    harness.transport.respond(
        "eve/CharacterName",
        success_body(
            r#"<rowset name="characters" key="characterID" columns="name,characterID">
  <row name="CCP Garthagk" characterID="797400947" />
  <row name="CCP Prism X" characterID="1188435724" />
</rowset>"#,
        ),
    );
    harness.transport.respond(
        "eve/CharacterID",
        success_body(
            r#"<rowset name="characters" key="characterID" columns="name,characterID">
  <row name="CCP Garthagk" characterID="797400947" />
</rowset>"#,
        ),
    );

    let eve = Eve::new(harness.api.clone());
    let names = eve
        .character_names_from_ids(&[797400947, 1188435724])
        .unwrap();
    assert_eq!(names.result[&797400947], "CCP Garthagk");

    let ids = eve
        .character_ids_from_names(&["CCP Garthagk", "Nobody"])
        .unwrap();
    assert_eq!(ids.result.get("CCP Garthagk"), Some(&797400947));

    let requests = harness.transport.requests();
    assert_eq!(param(&requests[0].params, "ids"), Some("797400947,1188435724"));
    assert_eq!(param(&requests[1].params, "names"), Some("CCP Garthagk,Nobody"));
}

#[test]
fn test_server_status_is_a_get() {
    let harness = TestApi::new();
    harness.transport.respond(
        "server/ServerStatus",
        success_body("<serverOpen>True</serverOpen><onlinePlayers>38102</onlinePlayers>"),
    );

    let status = Server::new(harness.api.clone()).server_status().unwrap();
    assert!(status.result.online);
    assert_eq!(status.result.players, 38102);
    assert_eq!(harness.transport.only_request().method(), Method::Get);
}

#[test]
fn test_malformed_result_is_parser_error() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("server/ServerStatus", success_body("<serverOpen>True</serverOpen>"));

    let err = Server::new(harness.api.clone()).server_status().unwrap_err();
    assert!(matches!(err, Error::Parser(_)));
}

#[test]
fn test_map_jumps_with_data_time() {
    let harness = TestApi::new();
    harness.transport.respond(
        "map/Jumps",
        success_body(&format!(
            r#"<rowset name="solarSystems" key="solarSystemID" columns="solarSystemID,shipJumps">
  <row solarSystemID="30001984" shipJumps="10" />
  <row solarSystemID="30000113" shipJumps="1" />
</rowset>
<dataTime>{}</dataTime>"#,
            CURRENT_TIME
        )),
    );

    let jumps = Map::new(harness.api.clone()).jumps_by_system().unwrap();
    assert_eq!(jumps.result.systems.len(), 2);
    assert_eq!(jumps.result.systems[&30001984], 10);
    assert_eq!(jumps.result.data_ts, Some(CURRENT_TS));
}

#[test]
fn test_account_characters_with_credentials() {
    let harness = TestApi::build(Arc::new(MemoryCache::new(10)), |api| {
        api.with_api_key(ApiKey::new(123456, "vcode"))
    });
    harness.transport.respond(
        "account/Characters",
        success_body(
            r#"<rowset name="characters" key="characterID" columns="name,characterID,corporationName,corporationID">
  <row name="Mary" characterID="150267069" corporationName="Starbase Anchoring Corp" corporationID="150279367" />
</rowset>"#,
        ),
    );

    let characters = Account::new(harness.api.clone()).characters().unwrap();
    let mary = &characters.result[&150267069];
    assert_eq!(mary.name, "Mary");
    assert_eq!(mary.corp.id, 150279367);
    assert_eq!(mary.alliance, None);

    let request = harness.transport.only_request();
    assert_eq!(param(&request.params, "keyID"), Some("123456"));
    assert_eq!(param(&request.params, "vCode"), Some("vcode"));
}

#[test]
fn test_wrappers_share_one_cache() {
    let harness = TestApi::new();
    harness.transport.respond("char/AccountBalance", success_body(WALLET));

    Char::new(1234, harness.api.clone()).wallet_info(None).unwrap();
    Char::new(1234, harness.api.clone()).wallet_balance(None).unwrap();
    assert_eq!(harness.transport.request_count(), 1);

    // A different character is a different request
    Char::new(5678, harness.api.clone()).wallet_info(None).unwrap();
    assert_eq!(harness.transport.request_count(), 2);
}
