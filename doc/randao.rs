//=====================================================================================================================
Consumer:

A consumer calls 3 operations on the registry

// start a new campaign, any attached value becomes bounty
- new_campaign(bnum, deposit, commit_balkline, commit_deadline) payable -> campaign_id
    - bnum in the future, 0 < commit_deadline <= commit_balkline, current block <= bnum - commit_balkline, deposit > 0

// follow an on-going campaign, at the latest at block bnum - commit_deadline
- follow(campaign_id) payable

// refund bounty if the campaign fails (from bnum on, unless every committer revealed)
- refund_bounty(campaign_id)

    $ randao new-campaign --from 0x..01 --value 100 --bnum 300 --deposit 10 --balkline 100 --deadline 50
    $ randao follow --from 0x..05 --value 20 --campaign 1
    $ randao refund --from 0x..01 --campaign 1


//=====================================================================================================================

Timeline of a campaign (bnum=300, commit_balkline=100, commit_deadline=50):

    block:   ... 199 | 200 ............ 249 | 250 ............ 299 | 300 ...
    phase:   open    | commit               | reveal               | settled

    - follow accepted up to and including block 250
    - commit accepted in [200, 250), value must equal the deposit
    - reveal accepted in [250, 300)
    - get_random, get_my_bounty, refund_bounty from 300 on


//=====================================================================================================================

Payouts at settlement:

    - everyone revealed:        each revealer gets deposit + bountypot / reveals_num
    - some did not reveal:      each revealer gets deposit + (commit_num - reveals_num) * deposit / reveals_num,
                                non-revealers get nothing, consumers may refund their bounty
    - nobody revealed:          every participant gets the deposit back, consumers may refund their bounty
