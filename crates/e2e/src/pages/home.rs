//! Login page of the shop and the inventory it leads to

use std::time::Duration;
use tracing::info;

use crate::config::{PacingConfig, SiteConfig};
use crate::error::E2eResult;
use crate::expect::{expect_title, expect_visible, DEFAULT_EXPECT_TIMEOUT};
use crate::locator::Locator;
use crate::page::Page;

/// Locators and actions for logging in and reaching the inventory.
pub struct HomePage<'p, P: Page + ?Sized> {
    page: &'p mut P,
    site: SiteConfig,
    pacing: PacingConfig,
    expect_timeout: Duration,

    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub inventory_list: Locator,
}

impl<'p, P: Page + ?Sized> HomePage<'p, P> {
    /// Page object for the public demo shop with its standard user
    pub fn new(page: &'p mut P) -> Self {
        Self::with_config(page, SiteConfig::default(), PacingConfig::default(), DEFAULT_EXPECT_TIMEOUT)
    }

    pub fn with_config(
        page: &'p mut P,
        site: SiteConfig,
        pacing: PacingConfig,
        expect_timeout: Duration,
    ) -> Self {
        Self {
            page,
            site,
            pacing,
            expect_timeout,
            username_input: Locator::id("user-name"),
            password_input: Locator::data_test("password"),
            login_button: Locator::id("login-button"),
            inventory_list: Locator::class("inventory_list"),
        }
    }

    pub async fn open(&mut self) -> E2eResult<()> {
        self.page.goto(&self.site.base_url).await
    }

    pub async fn validate_title(&mut self) -> E2eResult<()> {
        expect_title(&mut *self.page, &self.site.expected_title, self.expect_timeout).await?;
        info!("Title valid");
        self.page.wait_for_timeout(self.pacing.title_settle_ms).await
    }

    /// Fill both credentials and submit. A rejected login is not detected here.
    pub async fn login(&mut self) -> E2eResult<()> {
        let delay = self.pacing.step_delay_ms;

        self.page.fill(&self.username_input, &self.site.username).await?;
        self.page.wait_for_timeout(delay).await?;

        self.page.fill(&self.password_input, &self.site.password).await?;
        self.page.wait_for_timeout(delay).await?;

        self.page.click(&self.login_button).await?;
        self.page.wait_for_timeout(delay).await
    }

    /// The inventory list must become visible
    pub async fn page_inventory(&mut self) -> E2eResult<()> {
        expect_visible(&mut *self.page, &self.inventory_list, self.expect_timeout).await?;
        info!("Purchase page visible");
        Ok(())
    }
}
