use cardvault::engine::tokenizer::ScriptedTokenizer;
use cardvault::store::InMemoryUserRepository;
use cardvault::vault_core::audit::AuditLogger;
use cardvault::{CardId, Config, LoginRequest, Session, SessionContext, Token, User, UserRepository};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const ALPHABET: u8 = 12;
const USERS: [(&str, &str); 3] = [("alice", "pw1"), ("bob", "pw2"), ("carol", "pw3")];

fn tokenizer_script(draws: &[u8]) -> Vec<Token> {
    // Every token of the alphabet appears at the tail, so a registration
    // always finds a free token within one pass of the script.
    draws
        .iter()
        .chain((0..ALPHABET).collect::<Vec<_>>().iter())
        .map(|i| Token::new(format!("T{}", i)))
        .collect()
}

proptest! {
    #[test]
    fn test_tokens_globally_unique_despite_duplicate_candidates(
        draws in prop::collection::vec(0..ALPHABET, 1..40),
        plan in prop::collection::vec(0..USERS.len(), 1..=ALPHABET as usize),
    ) {
        let repo = Arc::new(InMemoryUserRepository::with_users(
            USERS.iter().map(|(u, p)| User::new(*u, *p)),
        ));
        let ctx = SessionContext::new(
            Arc::new(Config::default()),
            repo.clone(),
            Arc::new(ScriptedTokenizer::new(tokenizer_script(&draws))),
        )
        .with_audit(AuditLogger::disabled());

        let mut sessions: Vec<Session> = USERS
            .iter()
            .map(|(u, p)| Session::authenticate(&ctx, LoginRequest::new(*u, *p)).unwrap())
            .collect();

        let mut issued = HashSet::new();
        for (i, who) in plan.iter().enumerate() {
            let card = CardId::new(format!("4111{:012}", i));
            let token = sessions[*who].register_card(&card).unwrap();
            prop_assert!(issued.insert(token.clone()), "token {} issued twice", token);
            prop_assert_eq!(sessions[*who].get_card(&token).unwrap(), card);
        }

        let mut stored = HashSet::new();
        for user in repo.list_all().unwrap() {
            for token in user.tokens() {
                prop_assert!(stored.insert(token.clone()), "token {} stored twice", token);
            }
        }
        prop_assert_eq!(stored, issued);
    }

    #[test]
    fn test_export_has_header_plus_one_line_per_entry(
        n in 0usize..25,
        descending in any::<bool>(),
    ) {
        let script: Vec<Token> = (0..n.max(1)).map(|i| Token::new(format!("TK{:03}", i))).collect();
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![User::new("alice", "pw1")]));
        let ctx = SessionContext::new(
            Arc::new(Config::default()),
            repo,
            Arc::new(ScriptedTokenizer::new(script)),
        )
        .with_audit(AuditLogger::disabled());

        let mut session = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();
        for i in 0..n {
            session.register_card(&CardId::new(format!("5500{:012}", i))).unwrap();
        }

        let compare = |a: &Token, b: &Token| if descending { b.cmp(a) } else { a.cmp(b) };
        let mut out = Vec::new();
        session.export_sorted(compare, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.len(), n + 1);

        let mut expected: Vec<(Token, CardId)> = session
            .user()
            .token_map
            .iter()
            .flatten()
            .map(|(t, c)| (t.clone(), c.clone()))
            .collect();
        expected.sort_by(|a, b| compare(&a.0, &b.0));
        for (line, (token, card)) in lines[1..].iter().zip(expected.iter()) {
            prop_assert_eq!(line.to_string(), format!("{:<20}{:<20}", token, card));
        }
    }
}
