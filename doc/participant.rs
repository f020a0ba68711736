//=====================================================================================================================

Participant:

A participant calls 4 operations on the registry

// Get campaign
- get_campaign(campaign_id) -> CampaignInfo

// Commit phase: commit to a campaign, attaching exactly the deposit
- commit(campaign_id, hs) payable
    - hs = sha_commit(s) = keccak256(32-byte big-endian s), must not be blank

// Reveal phase: reveal secret
- reveal(campaign_id, s)

// Bounty phase: refund deposit and claim share
- get_my_bounty(campaign_id)


//=====================================================================================================================

Before joining:

    Load config.json (`randao show-config` prints a template) and check the campaign:
        - Make sure `campaign.deposit <= config.maxDeposit`.
        - Make sure `config.minRateOfReturn <= campaign.bountypot / campaign.deposit / (campaign.commit_num + 1)`.
        - Make sure `campaign.deposit + config.minBalanceReserve <= participant balance`.
        - Make sure the commit window is still open (`current height < bnum - commit_deadline`).
        - Make sure `commit_deadline > config.minRevealWindow`.
        - Make sure `config.minRevealWindow > config.maxRevealDelay`.
        - Make sure `config.maxCampaigns > current ongoing campaigns`.

    $ randao -c config.json check --campaign 1 --account 0x..02


//=====================================================================================================================

Work flow:

    1> Draw a secret and keep it until the campaign settles.
        $ randao secret
    2> Commit.
        $ randao commit --from 0x..02 --campaign 1 --secret <s>
    3> Wait for the reveal window (`bnum - commit_deadline`) and reveal before `bnum`.
        $ randao reveal --from 0x..02 --campaign 1 --secret <s>
       Failing to reveal forfeits the deposit to the participants who did.
    4> From `bnum` on, claim deposit and share.
        $ randao bounty --from 0x..02 --campaign 1
        $ randao random --campaign 1
