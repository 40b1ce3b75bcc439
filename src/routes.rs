use crate::{
    api::{department, employee, report, salary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_cors::Cors;
use actix_web::{http::header, middleware::from_fn, web};
use anyhow::{Context, Result};

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route rate limits. Built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimiters {
    login: LimiterConfig,
    register: LimiterConfig,
    protected: LimiterConfig,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min).context("RATE_LOGIN_PER_MIN")?,
            register: build_limiter(config.rate_register_per_min)
                .context("RATE_REGISTER_PER_MIN")?,
            protected: build_limiter(config.rate_protected_per_min)
                .context("RATE_PROTECTED_PER_MIN")?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("Invalid rate limit")
}

/// CORS for the configured browser origins. Preflight requests are answered
/// here, before the auth gate sees them.
pub fn cors(config: &Config) -> Cors {
    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &RateLimiters) {
    // Public routes
    cfg.service(
        web::scope(&format!("{}/auth", config.api_prefix))
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&limiters.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&limiters.register))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&limiters.login))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&limiters.login))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Registered ahead of the protected scope, which would otherwise claim the prefix
    cfg.service(
        web::resource(format!("{}/departments/init", config.api_prefix))
            .route(web::post().to(department::init_departments)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&limiters.protected)) // rate limiting
            .service(
                web::resource("/departments")
                    .route(web::get().to(department::list_departments))
                    .route(web::post().to(department::create_department)),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{employee_number}
                    .service(
                        web::resource("/{employee_number}")
                            .route(web::get().to(employee::get_employee)),
                    ),
            )
            .service(
                web::scope("/salaries")
                    // /salaries
                    .service(
                        web::resource("")
                            .route(web::get().to(salary::list_salaries))
                            .route(web::post().to(salary::create_salary)),
                    )
                    // /salaries/{salary_id}
                    .service(
                        web::resource("/{salary_id}")
                            .route(web::put().to(salary::update_salary))
                            .route(web::delete().to(salary::delete_salary)),
                    ),
            )
            .service(
                web::scope("/reports/payroll")
                    .service(web::resource("").route(web::get().to(report::payroll_report)))
                    .service(
                        web::resource("/{month}")
                            .route(web::get().to(report::payroll_report_by_month)),
                    ),
            ),
    );
}
