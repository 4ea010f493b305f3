mod support;

use std::sync::Arc;
use std::time::Duration;

use bank_crawler::clock::ManualClock;
use bank_crawler::models::User;
use bank_crawler::navigate::Navigator;
use bank_crawler::session::Locator;
use bank_crawler::signin::{SignIn, SignInPage, SignInState};
use bank_crawler::wait::ConditionWaiter;
use support::{portal, ElementSpec, FakePage, LANDING_MARKUP, LANDING_URL, SIGN_IN_URL};

fn sign_in_page() -> SignInPage {
    SignInPage {
        url: SIGN_IN_URL.to_string(),
        ..SignInPage::default()
    }
}

#[tokio::test]
async fn sign_in_types_credentials_and_reaches_landing() {
    let clock = Arc::new(ManualClock::new());
    let session = portal();
    let page = sign_in_page();
    let navigator = Navigator::new(clock.clone());
    let waiter = ConditionWaiter::new(clock.clone());
    let user = User::new("jdoe", "hunter2");

    let mut sign_in = SignIn::new(&page, &navigator, &waiter, Duration::from_secs(10));
    assert_eq!(sign_in.state(), SignInState::Start);

    assert!(sign_in.run(&session, &user).await);
    assert_eq!(sign_in.state(), SignInState::Authenticated);
    assert_eq!(session.loads(), vec![SIGN_IN_URL]);
    assert_eq!(
        session.typed(),
        vec![
            (Locator::css("#oid"), "jdoe".to_string()),
            (Locator::css("#pass"), "hunter2".to_string()),
        ]
    );
    assert_eq!(session.state().enters, vec![Locator::css("#pass")]);
}

#[tokio::test]
async fn landing_marker_detached_mid_navigation_still_signs_in() {
    let clock = Arc::new(ManualClock::new());
    let landing = FakePage::new(LANDING_MARKUP)
        .with_element(Locator::css("div.Accounts"), ElementSpec::new().stale_for(2));
    let session = portal().with_page(LANDING_URL, landing);
    let page = sign_in_page();
    let navigator = Navigator::new(clock.clone());
    let waiter = ConditionWaiter::new(clock.clone());
    let user = User::new("jdoe", "hunter2");

    let mut sign_in = SignIn::new(&page, &navigator, &waiter, Duration::from_secs(10));
    assert!(sign_in.run(&session, &user).await);
    assert_eq!(sign_in.state(), SignInState::Authenticated);
}

#[tokio::test]
async fn missing_landing_marker_fails_after_submit() {
    let clock = Arc::new(ManualClock::new());
    // Submitting lands on a security question instead of the accounts page.
    let session = portal().with_page(
        LANDING_URL,
        FakePage::new("<html><body>What was your first pet's name?</body></html>"),
    );
    let page = sign_in_page();
    let navigator = Navigator::new(clock.clone());
    let waiter = ConditionWaiter::new(clock.clone());
    let user = User::new("jdoe", "hunter2");

    let mut sign_in = SignIn::new(&page, &navigator, &waiter, Duration::from_secs(3));
    assert!(!sign_in.run(&session, &user).await);
    assert_eq!(sign_in.state(), SignInState::Failed);
    assert_eq!(session.state().enters.len(), 1);
}

#[tokio::test]
async fn missing_form_fails_before_typing() {
    let clock = Arc::new(ManualClock::new());
    let session = portal().with_page(SIGN_IN_URL, FakePage::new("<html>maintenance</html>"));
    let page = sign_in_page();
    let navigator = Navigator::new(clock.clone());
    let waiter = ConditionWaiter::new(clock.clone());
    let user = User::new("jdoe", "hunter2");

    let mut sign_in = SignIn::new(&page, &navigator, &waiter, Duration::from_secs(2));
    assert!(!sign_in.run(&session, &user).await);
    assert_eq!(sign_in.state(), SignInState::Failed);
    assert!(session.typed().is_empty());
    assert_eq!(clock.elapsed(), Duration::from_secs(2) + Duration::from_secs(2));
}

#[tokio::test]
async fn navigation_timeout_fails_sign_in() {
    let clock = Arc::new(ManualClock::new());
    let session = portal();
    session.queue_load_timeouts(8);
    let page = sign_in_page();
    let navigator = Navigator::new(clock.clone());
    let waiter = ConditionWaiter::new(clock.clone());
    let user = User::new("jdoe", "hunter2");

    let mut sign_in = SignIn::new(&page, &navigator, &waiter, Duration::from_secs(10));
    assert!(!sign_in.run(&session, &user).await);
    assert_eq!(sign_in.state(), SignInState::Failed);
    assert_eq!(session.loads().len(), 8);
}
