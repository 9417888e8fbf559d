use std::path::PathBuf;
use std::{env, fs};

const TOKEN_SECRET: &str = "token.secret";

/// Key material used to sign and verify identity tokens.
///
/// The signing secret comes from the `SECRET_KEY` environment variable when
/// set, otherwise from `security/token.secret`. With the `generate-security`
/// feature a missing secret is generated and persisted so restarts keep
/// previously issued tokens valid.
#[derive(Debug, Clone)]
pub struct Security {
    pub token_secret: Vec<u8>,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        if let Ok(secret) = env::var("SECRET_KEY") {
            tracing::info!("Using token signing secret from environment.");
            return Security {
                token_secret: secret.into_bytes(),
            };
        }

        let dir = security_dir();

        if cfg!(feature = "generate-security") {
            fs::create_dir_all(dir.clone())
                .expect("unable to create directory for storing security information");
        }

        tracing::info!("Loading token signing secret...");
        let secret = fs::read(dir.join(TOKEN_SECRET)).ok();

        let token_secret = match secret {
            Some(secret) => {
                tracing::info!("Token signing secret found and loaded.");
                secret
            }
            #[cfg(feature = "generate-security")]
            None => {
                tracing::info!(
                    "Secret not found in '{}'. Generating a new token signing secret.",
                    dir.join(TOKEN_SECRET).display()
                );
                let secret: Vec<u8> = (0..64).map(|_| rand::random::<u8>()).collect();

                fs::write(dir.join(TOKEN_SECRET), secret.as_slice())
                    .expect("unable to write token signing secret");

                secret
            }
            #[cfg(not(feature = "generate-security"))]
            None => {
                panic!("Unable to load token signing secret.");
            }
        };

        Security { token_secret }
    }
}
