#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

#[cfg(not(test))]
use defmt_rtt as _;
#[cfg(not(test))]
use panic_halt as _;
#[cfg(not(test))]
use rtic::app;

mod buttons;
mod clock;
mod display;

#[cfg(not(test))]
#[app(device = rp_pico::hal::pac, peripherals = true)]
mod app {
    use super::*;
    use crate::buttons::{adjust_table, AdjustButton, EdgeDetector};
    use crate::clock::{AlarmRequest, ClockState, Mode};
    use cortex_m::asm;
    use embedded_hal::digital::v2::{InputPin, OutputPin, ToggleableOutputPin};
    use rtic::mutex_prelude::*;
    use rp_pico::hal::{
        clocks::init_clocks_and_plls,
        fugit::ExtU32,
        gpio::{
            bank0::{Gpio10, Gpio11, Gpio25, Gpio8, Gpio9},
            DynPinId, FunctionSio, Interrupt, Pin, PullDown, PullUp, SioInput, SioOutput,
        },
        sio::Sio,
        timer::{Alarm, Alarm0, Timer},
        watchdog::Watchdog,
    };

    // Uniform types for the pin arrays (adjustment inputs, digit select
    // bus, value bus).
    type InputLine = Pin<DynPinId, FunctionSio<SioInput>, PullUp>;
    type OutputLine = Pin<DynPinId, FunctionSio<SioOutput>, PullDown>;

    /// One tick per second via the Alarm0 compare match.
    const TICK_PERIOD_US: u32 = 1_000_000;
    /// Per-digit hold on the display bus, ~5 ms at the 125 MHz system clock.
    const DIGIT_HOLD_CYCLES: u32 = 625_000;
    /// Settle after a mode toggle so the same press is not re-observed.
    const MODE_SETTLE_CYCLES: u32 = 625_000;

    // Shared resources (accessed by multiple tasks)
    #[shared]
    struct Shared {
        clock: ClockState,
        tick_alarm: Alarm0,
        ticking: bool,
        buzzer: OutputLine,
        led_count_up: OutputLine,
        led_count_down: OutputLine,
    }

    // Local resources (accessed by single tasks)
    #[local]
    struct Local {
        heartbeat: Pin<Gpio25, FunctionSio<SioOutput>, PullDown>,
        reset_line: Pin<Gpio9, FunctionSio<SioInput>, PullUp>,
        pause_line: Pin<Gpio10, FunctionSio<SioInput>, PullUp>,
        resume_line: Pin<Gpio11, FunctionSio<SioInput>, PullUp>,
        adjust_lines: [InputLine; 6],
        adjust_buttons: [AdjustButton; 6],
        mode_line: Pin<Gpio8, FunctionSio<SioInput>, PullUp>,
        mode_edge: EdgeDetector,
        digit_select: [OutputLine; 6],
        value_bus: [OutputLine; 4],
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut pac = ctx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let external_xtal_freq_hz = 12_000_000u32;
        let clocks = init_clocks_and_plls(
            external_xtal_freq_hz,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
        let mut tick_alarm = timer.alarm_0().unwrap();
        // Schedule the first tick one full period out
        tick_alarm.schedule(TICK_PERIOD_US.micros()).unwrap();
        tick_alarm.enable_interrupt();

        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let heartbeat = pins.led.into_push_pull_output();

        // Adjustment buttons, active low, in table order:
        // inc/dec hours, inc/dec minutes, inc/dec seconds
        let adjust_lines: [InputLine; 6] = [
            pins.gpio2.into_pull_up_input().into_dyn_pin(),
            pins.gpio3.into_pull_up_input().into_dyn_pin(),
            pins.gpio4.into_pull_up_input().into_dyn_pin(),
            pins.gpio5.into_pull_up_input().into_dyn_pin(),
            pins.gpio6.into_pull_up_input().into_dyn_pin(),
            pins.gpio7.into_pull_up_input().into_dyn_pin(),
        ];
        let mode_line = pins.gpio8.into_pull_up_input();

        // Control signals, active low, falling-edge interrupts
        let reset_line = pins.gpio9.into_pull_up_input();
        let pause_line = pins.gpio10.into_pull_up_input();
        let resume_line = pins.gpio11.into_pull_up_input();
        reset_line.set_interrupt_enabled(Interrupt::EdgeLow, true);
        pause_line.set_interrupt_enabled(Interrupt::EdgeLow, true);
        resume_line.set_interrupt_enabled(Interrupt::EdgeLow, true);

        let mut buzzer = pins.gpio12.into_push_pull_output().into_dyn_pin();
        let mut led_count_up = pins.gpio13.into_push_pull_output().into_dyn_pin();
        let mut led_count_down = pins.gpio14.into_push_pull_output().into_dyn_pin();
        buzzer.set_low().unwrap();
        // Boot mode is count-up; light its indicator from the start
        led_count_up.set_high().unwrap();
        led_count_down.set_low().unwrap();

        let mut digit_select: [OutputLine; 6] = [
            pins.gpio15.into_push_pull_output().into_dyn_pin(),
            pins.gpio16.into_push_pull_output().into_dyn_pin(),
            pins.gpio17.into_push_pull_output().into_dyn_pin(),
            pins.gpio18.into_push_pull_output().into_dyn_pin(),
            pins.gpio19.into_push_pull_output().into_dyn_pin(),
            pins.gpio20.into_push_pull_output().into_dyn_pin(),
        ];
        let mut value_bus: [OutputLine; 4] = [
            pins.gpio21.into_push_pull_output().into_dyn_pin(),
            pins.gpio22.into_push_pull_output().into_dyn_pin(),
            pins.gpio26.into_push_pull_output().into_dyn_pin(),
            pins.gpio27.into_push_pull_output().into_dyn_pin(),
        ];
        for line in digit_select.iter_mut() {
            line.set_low().unwrap();
        }
        for line in value_bus.iter_mut() {
            line.set_low().unwrap();
        }

        defmt::info!("stopwatch up: count-up mode, ticking");

        (
            Shared {
                clock: ClockState::new(),
                tick_alarm,
                ticking: true,
                buzzer,
                led_count_up,
                led_count_down,
            },
            Local {
                heartbeat,
                reset_line,
                pause_line,
                resume_line,
                adjust_lines,
                adjust_buttons: adjust_table(),
                mode_line,
                mode_edge: EdgeDetector::new(),
                digit_select,
                value_bus,
            },
            init::Monotonics(),
        )
    }

    fn drive_mode_leds(up: &mut OutputLine, down: &mut OutputLine, mode: Mode) {
        match mode {
            Mode::CountUp => {
                up.set_high().ok();
                down.set_low().ok();
            }
            Mode::CountDown => {
                up.set_low().ok();
                down.set_high().ok();
            }
        }
    }

    // Hardware Task: periodic tick (Alarm0 compare match, 1 Hz).
    // Priority 1: a control edge arriving in the same instant wins.
    #[task(binds = TIMER_IRQ_0, priority = 1, shared = [clock, tick_alarm, ticking, buzzer, led_count_up, led_count_down], local = [heartbeat])]
    fn timer_tick(mut ctx: timer_tick::Context) {
        let running = ctx.shared.ticking.lock(|t| *t);
        ctx.shared.tick_alarm.lock(|alarm| {
            alarm.clear_interrupt();
            if running {
                alarm.schedule(TICK_PERIOD_US.micros()).ok();
            }
        });
        // A compare match latched alongside a pause edge must not count
        if !running {
            return;
        }

        ctx.local.heartbeat.toggle().ok();

        let (mode, request) = ctx.shared.clock.lock(|c| {
            let request = c.tick();
            (c.mode, request)
        });

        (
            &mut ctx.shared.led_count_up,
            &mut ctx.shared.led_count_down,
            &mut ctx.shared.buzzer,
        )
            .lock(|up, down, buzzer| {
                drive_mode_leds(up, down, mode);
                match request {
                    AlarmRequest::Silence => {
                        buzzer.set_low().ok();
                    }
                    AlarmRequest::Raise => {
                        buzzer.set_high().ok();
                    }
                    AlarmRequest::Leave => {}
                }
            });
    }

    // Hardware Task: the three asynchronous control edges share the GPIO
    // interrupt vector. Pending lines are serviced in a fixed order: reset
    // first, then pause, then resume.
    #[task(binds = IO_IRQ_BANK0, priority = 2, shared = [clock, tick_alarm, ticking, buzzer], local = [reset_line, pause_line, resume_line])]
    fn control_edge(mut ctx: control_edge::Context) {
        if ctx.local.reset_line.interrupt_status(Interrupt::EdgeLow) {
            ctx.local.reset_line.clear_interrupt(Interrupt::EdgeLow);
            defmt::info!("control: reset");
            ctx.shared.clock.lock(|c| c.reset());
            // Reset also clears a raised alarm
            ctx.shared.buzzer.lock(|b| b.set_low().ok());
            // Restart the period from zero; a paused clock stays paused
            let running = ctx.shared.ticking.lock(|t| *t);
            if running {
                ctx.shared.tick_alarm.lock(|alarm| {
                    alarm.schedule(TICK_PERIOD_US.micros()).ok();
                });
            }
        }

        if ctx.local.pause_line.interrupt_status(Interrupt::EdgeLow) {
            ctx.local.pause_line.clear_interrupt(Interrupt::EdgeLow);
            defmt::info!("control: pause");
            ctx.shared.ticking.lock(|t| *t = false);
            ctx.shared.tick_alarm.lock(|alarm| {
                alarm.cancel().ok();
                alarm.clear_interrupt();
            });
        }

        if ctx.local.resume_line.interrupt_status(Interrupt::EdgeLow) {
            ctx.local.resume_line.clear_interrupt(Interrupt::EdgeLow);
            defmt::info!("control: resume");
            let was_running = ctx.shared.ticking.lock(|t| {
                let was = *t;
                *t = true;
                was
            });
            if !was_running {
                ctx.shared.tick_alarm.lock(|alarm| {
                    alarm.schedule(TICK_PERIOD_US.micros()).ok();
                });
            }
        }
    }

    // Main loop: mode toggle, manual adjustment, display scan.
    #[idle(shared = [clock, buzzer, led_count_up, led_count_down], local = [adjust_lines, adjust_buttons, mode_line, mode_edge, digit_select, value_bus])]
    fn idle(mut ctx: idle::Context) -> ! {
        loop {
            // Mode toggle: two-sample edge on the dedicated line
            let mode_pressed = ctx.local.mode_line.is_low().unwrap_or(false);
            if ctx.local.mode_edge.poll(mode_pressed) {
                let mode = ctx.shared.clock.lock(|c| {
                    c.toggle_mode();
                    c.mode
                });
                (
                    &mut ctx.shared.led_count_up,
                    &mut ctx.shared.led_count_down,
                    &mut ctx.shared.buzzer,
                )
                    .lock(|up, down, buzzer| {
                        drive_mode_leds(up, down, mode);
                        // Mode change clears a raised alarm
                        buzzer.set_low().ok();
                    });
                defmt::info!("mode toggled");
                asm::delay(MODE_SETTLE_CYCLES);
            }

            // Manual adjustment: sample all six lines, then run the
            // debounced pass and the carry pass as one critical section
            let mut levels = [false; 6];
            for (level, line) in levels.iter_mut().zip(ctx.local.adjust_lines.iter()) {
                *level = line.is_low().unwrap_or(false);
            }
            ctx.shared.clock.lock(|c| {
                for (button, &pressed) in ctx.local.adjust_buttons.iter_mut().zip(levels.iter()) {
                    button.poll(pressed, c);
                }
                c.normalize();
            });

            // Display scan: one snapshot per full multiplex cycle, one
            // select line high at a time
            let digits = ctx.shared.clock.lock(|c| crate::display::digits(c));
            for (index, &digit) in digits.iter().enumerate() {
                for line in ctx.local.digit_select.iter_mut() {
                    line.set_low().ok();
                }
                for (line, on) in ctx.local.value_bus.iter_mut().zip(crate::display::bcd(digit)) {
                    if on {
                        line.set_high().ok();
                    } else {
                        line.set_low().ok();
                    }
                }
                ctx.local.digit_select[index].set_high().ok();
                asm::delay(DIGIT_HOLD_CYCLES);
            }
        }
    }
}
