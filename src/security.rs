use std::path::PathBuf;
use std::{env, fs};

const JWT_SECRET_FILE: &str = "jwt.secret";

/// Material used to verify tokens minted by the identity provider. The
/// provider and this backend share the HS256 secret.
#[derive(Debug, Clone)]
pub struct Security {
    pub jwt_secret: Vec<u8>,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        if let Ok(secret) = env::var("JWT_SECRET") {
            tracing::info!("Using JWT secret from environment.");
            return Security {
                jwt_secret: secret.into_bytes(),
            };
        }

        let dir = security_dir();

        if cfg!(feature = "generate-security") {
            fs::create_dir_all(dir.clone())
                .expect("unable to create directory for storing security information");
        }

        tracing::info!("Loading JWT secret...");
        let jwt_secret = match fs::read(dir.join(JWT_SECRET_FILE)) {
            Ok(secret) => {
                tracing::info!("JWT secret found and loaded.");
                secret
            }
            #[cfg(feature = "generate-security")]
            Err(_) => {
                use rand::RngCore;

                tracing::info!(
                    "JWT secret not found in '{}'. Generating a new one.",
                    dir.join(JWT_SECRET_FILE).display()
                );

                let mut secret = vec![0u8; 64];
                rand::thread_rng().fill_bytes(&mut secret);

                fs::write(dir.join(JWT_SECRET_FILE), secret.as_slice())
                    .expect("unable to write JWT secret");

                secret
            }
            #[cfg(not(feature = "generate-security"))]
            Err(_) => {
                panic!("Unable to load JWT secret.");
            }
        };

        Security { jwt_secret }
    }
}
