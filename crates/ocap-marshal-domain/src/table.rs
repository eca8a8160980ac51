//! The token table.
//!
//! Maps token strings to bindings and reference ids back to tokens. All
//! mutation goes through two insert-if-absent operations, each performed
//! under a single lock, so concurrent first sightings of a reference or a
//! token can never mint twice.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use ocap_marshal_core::{MarshalError, PublicKey, RefId, Reference, Result, SecretKey, Token};

/// Key material held by a binding.
pub(crate) enum KeyMaterial {
    /// Locally minted token: we hold the secret that opens its envelopes.
    Local(SecretKey),
    /// Token of a remote capability: only its public key is known.
    Remote(PublicKey),
}

/// A table entry.
pub(crate) struct Binding {
    pub keys: KeyMaterial,
    pub reference: Reference,
}

#[derive(Default)]
pub(crate) struct TokenTable {
    inner: Mutex<TableInner>,
}

#[derive(Default)]
struct TableInner {
    /// Full tokens and short aliases, both pointing at the same binding.
    by_token: HashMap<String, Arc<Binding>>,
    /// Reference id -> the full token it was first bound under.
    by_reference: HashMap<RefId, String>,
}

impl TableInner {
    fn bind(&mut self, token: &Token, keys: KeyMaterial, reference: Reference) -> String {
        let full = token.to_string();
        let alias = token.alias();
        let id = reference.id();
        let binding = Arc::new(Binding { keys, reference });

        self.by_token.insert(alias, Arc::clone(&binding));
        self.by_token.insert(full.clone(), binding);
        self.by_reference.entry(id).or_insert_with(|| full.clone());
        full
    }
}

impl TokenTable {
    /// Token bound to `reference`, minting one with `mint` if there is none.
    pub fn token_for<F>(&self, reference: &Reference, mint: F) -> Result<String>
    where
        F: FnOnce() -> Result<(Token, KeyMaterial)>,
    {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.by_reference.get(&reference.id()) {
            return Ok(token.clone());
        }

        let (token, keys) = mint()?;
        Ok(inner.bind(&token, keys, reference.clone()))
    }

    /// Reference bound to `token` or its short alias, minting one with
    /// `mint` if neither form is bound.
    pub fn reference_for<F>(&self, token: &str, mint: F) -> Result<Reference>
    where
        F: FnOnce(&Token) -> Result<(KeyMaterial, Reference)>,
    {
        let mut inner = self.inner.lock();
        if let Some(binding) = inner.by_token.get(token) {
            return Ok(binding.reference.clone());
        }

        let parsed = Token::parse(token)?;
        if let Some(binding) = inner.by_token.get(&parsed.alias()) {
            return Ok(binding.reference.clone());
        }

        let (keys, reference) = mint(&parsed)?;
        inner.bind(&parsed, keys, reference.clone());
        Ok(reference)
    }

    /// Whether [`TokenTable::reference_for`] can succeed for `token`
    /// without consulting the mint: it is bound in either form, or it is a
    /// full token carrying a valid public key.
    ///
    /// Bindings are never removed, so a token that passes stays resolvable.
    pub fn check(&self, token: &str) -> Result<()> {
        let inner = self.inner.lock();
        if inner.by_token.contains_key(token) {
            return Ok(());
        }

        let parsed = Token::parse(token)?;
        if inner.by_token.contains_key(&parsed.alias()) {
            return Ok(());
        }
        if !parsed.is_full() {
            return Err(MarshalError::BadAddressFormat(token.to_string()));
        }
        parsed.public_key().map(|_| ())
    }

    /// Bind `token` unless either of its forms is already bound.
    ///
    /// Returns false if the token was already present.
    pub fn insert(&self, token: &Token, keys: KeyMaterial, reference: Reference) -> bool {
        let mut inner = self.inner.lock();
        if inner.by_token.contains_key(&token.alias())
            || inner.by_token.contains_key(&token.to_string())
        {
            return false;
        }
        inner.bind(token, keys, reference);
        true
    }

    pub fn lookup(&self, address: &str) -> Option<Arc<Binding>> {
        self.inner.lock().by_token.get(address).cloned()
    }

    /// Number of bound token strings, aliases included.
    pub fn len(&self) -> usize {
        self.inner.lock().by_token.len()
    }
}
