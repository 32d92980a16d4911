mod test_utils;

use std::path::PathBuf;

use sosika_admin::{session, Config, Overrides};

use test_utils::FakeApi;

fn config_in(dir: &str) -> Config {
    let path: PathBuf = std::env::temp_dir()
        .join(format!("sosika-admin-login-{}-{}", std::process::id(), dir))
        .join("session.json");
    Config::merge(
        Overrides {
            base_url: Some("http://localhost:9".to_owned()),
            session_path: Some(path.to_string_lossy().into_owned()),
            ..Overrides::default()
        },
        Default::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn successful_login_stores_the_token() {
    let api = FakeApi {
        password: "secret".to_owned(),
        ..FakeApi::default()
    };
    let config = config_in("ok");

    let stored = sosika_admin::login(&api, &config, "admin@sosika.app", "secret")
        .await
        .unwrap();
    assert_eq!(stored.admin_token, "token-for-admin@sosika.app");
    assert_eq!(session::read(&config.session_path).unwrap(), Some(stored));

    assert!(session::clear(&config.session_path).unwrap());
}

#[tokio::test]
async fn rejected_login_keeps_the_server_message_and_stores_nothing() {
    let api = FakeApi {
        password: "secret".to_owned(),
        ..FakeApi::default()
    };
    let config = config_in("rejected");

    let err = sosika_admin::login(&api, &config, "admin@sosika.app", "guess")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(sosika_admin::login_failure_message(&err), "Invalid credentials");
    assert_eq!(session::read(&config.session_path).unwrap(), None);
}

#[tokio::test]
async fn unwritable_session_reports_the_whole_chain() {
    let api = FakeApi {
        password: "secret".to_owned(),
        ..FakeApi::default()
    };
    let blocker = std::env::temp_dir().join(format!("sosika-admin-login-{}-file", std::process::id()));
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = Config::merge(
        Overrides {
            base_url: Some("http://localhost:9".to_owned()),
            session_path: Some(blocker.join("session.json").to_string_lossy().into_owned()),
            ..Overrides::default()
        },
        Default::default(),
    )
    .unwrap();

    let err = sosika_admin::login(&api, &config, "admin@sosika.app", "secret")
        .await
        .unwrap_err();
    assert!(sosika_admin::login_failure_message(&err).starts_with("Error saving session to"));

    std::fs::remove_file(&blocker).unwrap();
}
