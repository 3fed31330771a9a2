use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::Duration,
};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// What a fake server saw from its single client.
pub struct ServerLog {
    pub commands: Vec<Vec<String>>,
    pub closed_by_client: bool,
}

/// Accepts one client, answers each incoming command with the next canned
/// RESP reply, then either waits for the client to hang up or hangs up itself.
/// Every command the client sends counts against the script, so any traffic
/// the client library adds on its own shows up in `ServerLog::commands`.
pub struct FakeServer {
    pub port: u16,
    handle: JoinHandle<ServerLog>,
}

fn malformed(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, what.to_owned())
}

/// `Ok(None)` on a clean hang-up; `Err` on garbage or when the client stalls.
fn read_command(reader: &mut BufReader<TcpStream>) -> io::Result<Option<Vec<String>>> {
    let mut header: String = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Ok(None);
    }
    let count: usize = header
        .trim_end()
        .strip_prefix('*')
        .and_then(|count: &str| count.parse().ok())
        .ok_or_else(|| malformed("array header"))?;
    let mut fields: Vec<String> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut length: String = String::new();
        reader.read_line(&mut length)?;
        let length: usize = length
            .trim_end()
            .strip_prefix('$')
            .and_then(|length: &str| length.parse().ok())
            .ok_or_else(|| malformed("bulk header"))?;
        let mut data: Vec<u8> = vec![0; length + 2];
        reader.read_exact(&mut data)?;
        data.truncate(length);
        fields.push(String::from_utf8(data).map_err(|_| malformed("utf-8"))?);
    }
    Ok(Some(fields))
}

impl FakeServer {
    pub fn start(replies: Vec<&'static [u8]>) -> Self {
        Self::spawn(replies, false)
    }
    pub fn start_hanging_up(replies: Vec<&'static [u8]>) -> Self {
        Self::spawn(replies, true)
    }
    fn spawn(replies: Vec<&'static [u8]>, hang_up: bool) -> Self {
        let listener: TcpListener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port: u16 = listener.local_addr().unwrap().port();
        let handle: JoinHandle<ServerLog> = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(READ_TIMEOUT)).unwrap();
            let mut writer: TcpStream = stream.try_clone().unwrap();
            let mut reader: BufReader<TcpStream> = BufReader::new(stream);
            let mut log: ServerLog = ServerLog {
                commands: Vec::new(),
                closed_by_client: false,
            };
            for reply in replies {
                match read_command(&mut reader) {
                    Ok(Some(command)) => log.commands.push(command),
                    Ok(None) => {
                        log.closed_by_client = true;
                        return log;
                    }
                    Err(_) => return log,
                }
                writer.write_all(reply).unwrap();
            }
            if hang_up {
                return log;
            }
            loop {
                match read_command(&mut reader) {
                    Ok(Some(command)) => log.commands.push(command),
                    Ok(None) => {
                        log.closed_by_client = true;
                        return log;
                    }
                    Err(_) => return log,
                }
            }
        });
        Self { port, handle }
    }
    pub fn finish(self) -> ServerLog {
        self.handle.join().unwrap()
    }
}
