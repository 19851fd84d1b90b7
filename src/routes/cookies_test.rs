use super::*;

fn jar_with(token: &str, expiry: &str) -> CookieJar {
    CookieJar::new()
        .add(Cookie::new(TOKEN_COOKIE, token.to_owned()))
        .add(Cookie::new(TOKEN_EXPIRY_COOKIE, expiry.to_owned()))
}

#[test]
fn token_from_jar_requires_both_cookies() {
    assert!(token_from_jar(&CookieJar::new()).is_none());

    let only_token = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "abc"));
    assert!(token_from_jar(&only_token).is_none());

    let token = token_from_jar(&jar_with("abc", "4102444800000")).unwrap();
    assert_eq!(token.value, "abc");
    assert_eq!(token.expires_at_millis(), 4_102_444_800_000);
}

#[test]
fn token_from_jar_rejects_unreadable_expiry() {
    assert!(token_from_jar(&jar_with("abc", "tomorrow")).is_none());
    assert!(token_from_jar(&jar_with("", "4102444800000")).is_none());
}

#[test]
fn store_writes_both_cookies_with_matching_max_age() {
    let slot = CookieSlot::new(CookieJar::new(), true);
    let token = CredentialToken::issued_now("tok".to_owned(), 3600);
    slot.store(&token);

    let loaded = slot.load().unwrap();
    assert_eq!(loaded.value, "tok");
    assert_eq!(loaded.expires_at_millis(), token.expires_at_millis());

    let jar = slot.into_jar();
    let value = jar.get(TOKEN_COOKIE).unwrap();
    assert_eq!(value.value(), "tok");
    assert_eq!(value.http_only(), Some(true));
    assert_eq!(value.secure(), Some(true));
    assert_eq!(value.same_site(), Some(SameSite::Lax));
    assert_eq!(value.path(), Some("/"));
    let max_age = value.max_age().unwrap();
    assert!(max_age > time::Duration::minutes(59) && max_age <= time::Duration::hours(1));

    let expiry = jar.get(TOKEN_EXPIRY_COOKIE).unwrap();
    assert_eq!(expiry.value(), token.expires_at_millis().to_string());
}

#[test]
fn clear_removes_persisted_token() {
    let slot = CookieSlot::new(jar_with("abc", "4102444800000"), false);
    assert!(slot.load().is_some());

    slot.clear();
    assert!(slot.load().is_none());
    let jar = slot.into_jar();
    assert!(jar.get(TOKEN_COOKIE).is_none());
    assert!(jar.get(TOKEN_EXPIRY_COOKIE).is_none());
}
