use crate::bonds::{unix_now, Amount, MintRequest, Token};
use crate::cache::RefreshTarget;
use crate::chain::{ChainOperation, Payment};
use crate::quoting::{Quote, QuoteRequest};
use crate::transaction::{MintPhase, TransactionStatus};
use crate::workflow::pipeline::{Flight, WritePlan};
use crate::workflow::{WorkflowError, Workflows};

impl Workflows {
    /// Validate, price (for USDC payment) and claim the account's mint slot.
    pub async fn begin_mint(&self, request: &MintRequest) -> Result<Flight<MintPhase>, WorkflowError> {
        let params = request.validate()?;
        let key = params.account.to_string();
        Self::ensure_idle(&self.mint, &key)?;

        let (payment, quote_expires_at) = match params.payment {
            Token::Flow => (Payment::Flow, None),
            Token::Usdc => {
                let quote = self.usdc_quote_for(params.amount).await?;
                let max_input = quote.max_input(self.default_slippage_bps).ok_or_else(|| {
                    WorkflowError::QuoteUnavailable("Quoted USDC amount is out of range".into())
                })?;
                (Payment::Usdc { max_input }, quote.expires_at)
            }
        };

        let plan = WritePlan {
            account: params.account.clone(),
            setup: Some((MintPhase::Checking, MintPhase::Setup)),
            submit: MintPhase::Minting,
            submit_message: format!("Minting your {} FLOW bond...", params.amount),
            success_message: format!(
                "Bond minted: {} FLOW locked for {} days",
                params.amount,
                params.lockup.days()
            ),
            operation: ChainOperation::MintBond {
                amount: params.amount,
                lockup_days: params.lockup.days(),
                strategy: params.strategy,
                payment,
            },
            quote_expires_at,
            refresh: Some(RefreshTarget::Bonds(params.account)),
        };
        Flight::launch(&self.mint, key, plan, self.gateway.clone(), self.cache.clone())
    }

    /// Mint and wait for the terminal status.
    pub async fn mint(&self, request: &MintRequest) -> Result<TransactionStatus<MintPhase>, WorkflowError> {
        Ok(self.begin_mint(request).await?.run().await)
    }

    /// Exact-output quote for paying `amount` FLOW worth of bond with USDC.
    async fn usdc_quote_for(&self, amount: Amount) -> Result<Quote, WorkflowError> {
        let request = QuoteRequest::exact_output(Token::Usdc, Token::Flow, amount)
            .map_err(|e| WorkflowError::QuoteUnavailable(e.to_string()))?;
        let quote = self.quotes.quote(&request).await.ok_or_else(|| {
            WorkflowError::QuoteUnavailable(
                "No USDC quote available. Pay with FLOW or try again shortly".into(),
            )
        })?;
        if quote.is_expired(unix_now()) {
            return Err(WorkflowError::QuoteUnavailable("The USDC quote has expired".into()));
        }
        Ok(quote)
    }
}
